use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::error::Error;

/// One external command: program, arguments, working directory and the
/// files it is expected to leave behind on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub expected_outputs: Vec<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            expected_outputs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Registers a file that must exist once the command exits successfully.
    pub fn expects(mut self, path: impl Into<PathBuf>) -> Self {
        self.expected_outputs.push(path.into());
        self
    }

    /// Shell-like rendering for logs and messages. Not meant to be re-parsed.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {})", self.command_line(), self.cwd.display())
    }
}

/// Exit status and captured streams of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands on behalf of a simulation.
///
/// Implementations block until the command exits and report a command
/// that cannot be started as [`Error::ExecutableNotFound`] or
/// [`Error::Io`]. A non-zero exit is *not* an error at this level; it is
/// returned in [`CapturedOutput::code`] and turned into
/// [`Error::Process`] by [`execute`].
pub trait Invoker: Send + Sync + fmt::Debug {
    fn invoke(&self, invocation: &Invocation) -> Result<CapturedOutput, Error>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInvoker;

impl Invoker for SystemInvoker {
    fn invoke(&self, invocation: &Invocation) -> Result<CapturedOutput, Error> {
        // A missing cwd also surfaces as NotFound from spawn.
        if !invocation.cwd.is_dir() {
            return Err(Error::io(
                &invocation.cwd,
                std::io::Error::new(ErrorKind::NotFound, "working directory does not exist"),
            ));
        }

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::ExecutableNotFound {
                    program: invocation.program.clone(),
                },
                _ => Error::io(&invocation.program, e),
            })?;

        Ok(CapturedOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs `invocation` and enforces the command contract: a zero exit status
/// and every expected output present.
pub fn execute(invoker: &dyn Invoker, invocation: &Invocation) -> Result<CapturedOutput, Error> {
    debug!("running {invocation}");

    let output = invoker.invoke(invocation)?;

    if !output.is_success() {
        return Err(Error::process(
            invocation.program.as_str(),
            output.code,
            &output.stderr,
            &output.stdout,
        ));
    }

    if let Some(missing) = first_missing(&invocation.expected_outputs) {
        return Err(Error::MissingOutput {
            program: invocation.program.clone(),
            path: missing.to_path_buf(),
        });
    }

    debug!("{} exited successfully", invocation.program);
    Ok(output)
}

fn first_missing(paths: &[PathBuf]) -> Option<&Path> {
    paths.iter().map(PathBuf::as_path).find(|p| !p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::FailureKind;
    use std::fs;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Scripted {
        output: CapturedOutput,
        writes: Vec<PathBuf>,
        seen: Mutex<Vec<String>>,
    }

    impl Invoker for Scripted {
        fn invoke(&self, invocation: &Invocation) -> Result<CapturedOutput, Error> {
            self.seen.lock().unwrap().push(invocation.command_line());
            for path in &self.writes {
                fs::write(path, b"solid").unwrap();
            }
            Ok(self.output.clone())
        }
    }

    fn scripted(output: CapturedOutput, writes: Vec<PathBuf>) -> Scripted {
        Scripted {
            output,
            writes,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        let inv = Invocation::new("matlab", "/tmp")
            .arg("-batch")
            .arg("f(\"a\", 1)");
        assert_eq!(inv.command_line(), "matlab -batch 'f(\"a\", 1)'");
    }

    #[test]
    fn execute_succeeds_when_outputs_exist() {
        let dir = tempfile::tempdir().unwrap();
        let stl = dir.path().join("packing_parameters.stl");
        let invoker = scripted(CapturedOutput::success(), vec![stl.clone()]);
        let inv = Invocation::new("packgen", dir.path()).arg("--").expects(&stl);

        let out = execute(&invoker, &inv).unwrap();
        assert!(out.is_success());
        assert_eq!(invoker.seen.lock().unwrap().as_slice(), ["packgen --"]);
    }

    #[test]
    fn nonzero_exit_becomes_process_error() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = scripted(CapturedOutput::exited(3, "", "bad seed"), Vec::new());
        let inv = Invocation::new("packgen", dir.path());

        let err = execute(&invoker, &inv).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ProcessFailure);
        assert!(err.to_string().contains("return code 3"));
        assert!(err.to_string().contains("bad seed"));
    }

    #[test]
    fn clean_exit_without_artifact_is_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let stl = dir.path().join("packing_parameters.stl");
        let invoker = scripted(CapturedOutput::success(), Vec::new());
        let inv = Invocation::new("packgen", dir.path()).expects(&stl);

        match execute(&invoker, &inv) {
            Err(Error::MissingOutput { program, path }) => {
                assert_eq!(program, "packgen");
                assert_eq!(path, stl);
            }
            other => panic!("expected MissingOutput, got {other:?}"),
        }
    }

    #[test]
    fn system_invoker_reports_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("packsim-no-such-program-4f1c", dir.path());

        let err = execute(&SystemInvoker, &inv).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ExecutableNotFound);
        assert!(err.to_string().contains("executable not found"));
    }

    #[test]
    fn system_invoker_rejects_missing_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", dir.path().join("absent"));

        let err = SystemInvoker.invoke(&inv).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn system_invoker_captures_exit_code_and_streams() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", dir.path())
            .arg("-c")
            .arg("echo out; echo boom >&2; exit 3");

        match execute(&SystemInvoker, &inv) {
            Err(Error::Process {
                program,
                code,
                stderr,
                stdout,
            }) => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
                assert_eq!(stdout, "out");
            }
            other => panic!("expected Process error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_invoker_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker.txt");
        let inv = Invocation::new("sh", dir.path())
            .arg("-c")
            .arg("touch marker.txt")
            .expects(&marker);

        assert!(execute(&SystemInvoker, &inv).is_ok());
        assert!(marker.is_file());
    }
}
