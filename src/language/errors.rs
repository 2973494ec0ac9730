use crate::language::span::Span;
use miette::SourceSpan;
use thiserror::Error;

/// Front-end error; the lexer and parser collect these and report in batch.
#[derive(Clone, Debug)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn to_source_span(&self) -> SourceSpan {
        (self.span.start, self.span.len()).into()
    }
}

/// Semantic failure from the two passes; the first one aborts the unit.
#[derive(Clone, Debug, Error)]
pub enum CompileError {
    #[error("{message}")]
    Type { message: String, span: Span },

    #[error("`{name}` is not defined")]
    Undefined { name: String, span: Span },

    /// Broken pipeline invariant; never caused by user input.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompileError {
    pub fn type_error(span: Span, message: impl Into<String>) -> Self {
        CompileError::Type {
            message: message.into(),
            span,
        }
    }

    pub fn undefined(span: Span, name: impl Into<String>) -> Self {
        CompileError::Undefined {
            name: name.into(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Type { span, .. } => Some(*span),
            CompileError::Undefined { span, .. } => Some(*span),
            CompileError::Internal { .. } => None,
        }
    }
}
