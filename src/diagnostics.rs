use crate::language::errors::{CompileError, SyntaxError};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help.clone(),
            message: err.message.clone(),
        }
    }
}

// Internal errors have no source location, so the label is absent.
#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct CompileDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: Option<SourceSpan>,
    message: String,
}

impl CompileDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: &CompileError) -> Self {
        Self {
            src,
            span: err
                .span()
                .map(|span| SourceSpan::from((span.start, span.len()))),
            message: err.to_string(),
        }
    }
}

pub fn report_syntax_errors(path: &Path, source: &str, errors: &[SyntaxError]) {
    let src = NamedSource::new(path.display().to_string(), source.to_string());
    for err in errors {
        let diagnostic = SyntaxDiagnostic::from_error(src.clone(), err.clone());
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

pub fn report_compile_error(path: &Path, source: &str, error: &CompileError) {
    let src = NamedSource::new(path.display().to_string(), source.to_string());
    let diagnostic = CompileDiagnostic::from_error(src, error);
    eprintln!("{:?}", Report::new(diagnostic));
}

pub fn report_io_error(path: &Path, error: &std::io::Error) {
    eprintln!("Failed to access {}: {}", path.display(), error);
}
