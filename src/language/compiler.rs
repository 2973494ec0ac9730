use crate::language::{
    codegen::{GeneratedMethod, generate_program},
    errors::{CompileError, SyntaxError},
    lexer::lex,
    parser::parse,
    typecheck::check_program,
};
use std::path::Path;

/// Why a compilation produced no class: the front end batches its errors,
/// the passes abort on the first.
#[derive(Debug)]
pub enum CompileFailure {
    Syntax(Vec<SyntaxError>),
    Semantic(CompileError),
}

/// A fully compiled unit: the class name and the generated entry method.
#[derive(Clone, Debug)]
pub struct CompiledClass {
    pub name: String,
    pub method: GeneratedMethod,
}

impl CompiledClass {
    /// Renders the complete assembler file around the generated body.
    pub fn to_jasmin(&self) -> String {
        let mut lines: Vec<String> = vec![
            format!(".class public {}", self.name),
            ".super java/lang/Object".into(),
            String::new(),
            ".method public <init>()V".into(),
            "\taload_0".into(),
            "\tinvokenonvirtual java/lang/Object/<init>()V".into(),
            "\treturn".into(),
            ".end method".into(),
            String::new(),
            ".method public static main([Ljava/lang/String;)V".into(),
        ];
        lines.extend(self.method.body_lines());
        lines.push("return".into());
        lines.push(".end method".into());
        lines.join("\n")
    }

    pub fn jasmin_file_name(&self) -> String {
        format!("{}.j", self.name)
    }
}

/// Runs the whole pipeline over one source string: lex, parse, type-check,
/// generate. `name` becomes the emitted class name.
pub fn compile_source(name: &str, source: &str) -> Result<CompiledClass, CompileFailure> {
    let tokens = lex(source).map_err(CompileFailure::Syntax)?;
    let program = parse(&tokens).map_err(CompileFailure::Syntax)?;
    let types = check_program(&program).map_err(CompileFailure::Semantic)?;
    let method = generate_program(&program, types).map_err(CompileFailure::Semantic)?;
    Ok(CompiledClass {
        name: name.to_string(),
        method,
    })
}

/// The file stem: `demos/hello.stilt` compiles to class `hello`.
pub fn class_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Main".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn pipeline_produces_a_complete_class_file() {
        let class = compile_source("Demo", "print(1);").expect("compile");
        let jasmin = class.to_jasmin();

        assert!(jasmin.starts_with(".class public Demo\n.super java/lang/Object"));
        assert!(jasmin.contains(".method public static main([Ljava/lang/String;)V"));
        assert!(jasmin.contains("invokenonvirtual java/lang/Object/<init>()V"));
        assert!(jasmin.ends_with("return\n.end method"));
    }

    #[test]
    fn frame_limits_reflect_the_program() {
        let class = compile_source("Demo", "a = 1.5; print(a);").expect("compile");
        let jasmin = class.to_jasmin();
        assert!(jasmin.contains(".limit locals 3"));
        assert!(jasmin.contains(".limit stack 3"));
    }

    #[test]
    fn limits_precede_the_first_instruction() {
        let class = compile_source("Demo", "a = 1;").expect("compile");
        let jasmin = class.to_jasmin();
        let locals = jasmin.find(".limit locals").expect("locals limit");
        let stack = jasmin.find(".limit stack").expect("stack limit");
        let first = jasmin.find("ldc 1").expect("first instruction");
        assert!(locals < stack && stack < first);
    }

    #[test]
    fn syntax_errors_are_batched() {
        let failure = compile_source("Demo", "a = ; b = ;").expect_err("should fail");
        let CompileFailure::Syntax(errors) = failure else {
            panic!("expected syntax failure");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn semantic_failure_carries_the_first_error_only() {
        let failure = compile_source("Demo", "print(x); print(y);").expect_err("should fail");
        let CompileFailure::Semantic(err) = failure else {
            panic!("expected semantic failure");
        };
        assert!(matches!(err, CompileError::Undefined { ref name, .. } if name == "x"));
    }

    #[test]
    fn class_name_comes_from_the_file_stem() {
        assert_eq!(class_name_for(&PathBuf::from("demos/hello.stilt")), "hello");
        assert_eq!(class_name_for(&PathBuf::from("loop.stilt")), "loop");
    }

    #[test]
    fn jasmin_file_name_uses_the_class_name() {
        let class = compile_source("hello", "print(1);").expect("compile");
        assert_eq!(class.jasmin_file_name(), "hello.j");
    }
}
