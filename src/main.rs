use stilt_lang::diagnostics::{report_compile_error, report_io_error, report_syntax_errors};
use stilt_lang::language::{
    compiler::{CompileFailure, class_name_for, compile_source},
    runner,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: ./stilt-lang [build|run] <filename.stilt>");
        std::process::exit(1);
    }

    let command = &args[1];
    let filename = PathBuf::from(&args[2]);

    if filename.extension().and_then(|ext| ext.to_str()) != Some("stilt") {
        eprintln!("Invalid file extension. Only .stilt files are allowed.");
        std::process::exit(1);
    }

    let source = match fs::read_to_string(&filename) {
        Ok(source) => source,
        Err(err) => {
            report_io_error(&filename, &err);
            std::process::exit(1);
        }
    };

    let name = class_name_for(&filename);
    let class = match compile_source(&name, &source) {
        Ok(class) => class,
        Err(CompileFailure::Syntax(errors)) => {
            report_syntax_errors(&filename, &source, &errors);
            std::process::exit(1);
        }
        Err(CompileFailure::Semantic(err)) => {
            report_compile_error(&filename, &source, &err);
            std::process::exit(1);
        }
    };

    let jasmin_file = PathBuf::from(class.jasmin_file_name());
    if let Err(err) = fs::write(&jasmin_file, class.to_jasmin()) {
        report_io_error(&jasmin_file, &err);
        std::process::exit(1);
    }

    match command.as_str() {
        "build" => {
            println!("Wrote {}", jasmin_file.display());
            assemble(&jasmin_file);
        }
        "run" => {
            assemble(&jasmin_file);
            match runner::execute(&class.name) {
                Ok(log) => {
                    print!("{log}");
                    if !log.succeeded() {
                        std::process::exit(1);
                    }
                }
                Err(err) => {
                    eprintln!("Failed to run class {}: {err}", class.name);
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Invalid command. Usage: ./stilt-lang [build|run] <filename.stilt>");
            std::process::exit(1);
        }
    }
}

fn assemble(jasmin_file: &Path) {
    match runner::assemble(Path::new("jasmin.jar"), jasmin_file) {
        Ok(log) => {
            if !log.succeeded() {
                eprint!("{log}");
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("Failed to invoke the assembler: {err}");
            std::process::exit(1);
        }
    }
}
