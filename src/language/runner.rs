use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;

#[derive(Clone, Debug)]
pub struct ExecutionLog {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionLog {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl fmt::Display for ExecutionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => writeln!(f, "exit value: {code}")?,
            None => writeln!(f, "terminated by signal")?,
        }
        if !self.stderr.is_empty() {
            writeln!(f, "error:\n{}", self.stderr)?;
        }
        if !self.stdout.is_empty() {
            writeln!(f, "output:\n{}", self.stdout)?;
        }
        Ok(())
    }
}

/// Assembles a `.j` file into a class file: `java -jar <jasmin.jar> <file>`.
pub fn assemble(jar_path: &Path, jasmin_file: &Path) -> io::Result<ExecutionLog> {
    run(Command::new("java")
        .arg("-jar")
        .arg(jar_path)
        .arg(jasmin_file))
}

/// Runs an assembled class through the JVM: `java <ClassName>`.
pub fn execute(class_name: &str) -> io::Result<ExecutionLog> {
    run(Command::new("java").arg(class_name))
}

fn run(command: &mut Command) -> io::Result<ExecutionLog> {
    let output = command.output()?;
    Ok(ExecutionLog {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
