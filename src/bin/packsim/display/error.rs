use std::io::{self, Write};

use anyhow::Error;
use packsim::FailureKind;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in wrap(&msg, 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_io_hints(err);
        collector.collect_simulation_hints(err);
        collector.collect_run_failure_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use packsim::io::Error as IoError;

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();

        match io_err {
            IoError::Io { source } => {
                self.collect_std_io_hints(source);
            }

            IoError::Json(e) => {
                self.add(format!(
                    "JSON syntax problem near line {}, column {}",
                    e.line(),
                    e.column()
                ));
                self.add("Required keys: particle_A, num_cubes_xy, num_cubes_z, L, work_dir");
                self.add("Use --format toml if the document is TOML");
            }

            IoError::Toml(_) => {
                self.add("The TOML document could not be parsed");
                self.add("Species go in [particle_A] and [particle_B] tables");
                self.add("Use --format json if the document is JSON");
            }

            IoError::UnsupportedFormat(fmt) => {
                self.add(format!("The '{}' format cannot be used here", fmt));
                self.add("Reports are always written as JSON");
            }

            IoError::Invalid(_) => {
                self.add("Check the request document against the documented keys");
                self.add("n and threads must be at least 1; cutoff must be non-negative");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid data (not UTF-8?)");
                self.add("Verify the request document is plain text");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            ErrorKind::WriteZero => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            ErrorKind::BrokenPipe => {
                self.add("Broken pipe: the output consumer terminated");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_simulation_hints(&mut self, err: &Error) {
        use packsim::Error as SimError;

        let Some(sim_err) = err.downcast_ref::<SimError>() else {
            return;
        };

        self.mark_typed();

        match sim_err {
            SimError::InvalidParameter(_) => {
                self.add("Radius, thickness and density must be positive and finite");
                self.add("mass_fraction_B must lie in [0, 1]");
                self.add("Lattice counts and L must be positive");
            }

            SimError::Io { source, .. } => {
                self.add("The work directory could not be prepared");
                self.collect_std_io_hints(source);
            }

            SimError::ThreadPool(_) => {
                self.add("Reduce the worker count with -j/--threads");
            }

            other => self.add_kind_hints(other.kind()),
        }
    }

    fn collect_run_failure_hints(&mut self, err: &Error) {
        let Some(failure) = err.downcast_ref::<packsim::RunFailure>() else {
            return;
        };

        self.mark_typed();

        if let Some(index) = failure.index {
            self.add(format!(
                "Artifacts of the run are kept in {}",
                packsim::run_dir_name(index)
            ));
        }
        self.add_kind_hints(failure.kind);
    }

    fn add_kind_hints(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::ProcessFailure => {
                self.add("An external tool exited with an error; see its stderr above");
                self.add("Rerun with -vv to log the exact command lines");
            }

            FailureKind::ExecutableNotFound => {
                self.add("Install the tool or put it on PATH");
                self.add("Or point to it with --packgen / --matlab");
            }

            FailureKind::MissingOutputArtifact => {
                self.add("The tool ran but did not write its expected output");
                self.add("Inspect the run directory for partial artifacts");
            }

            FailureKind::MalformedOutput => {
                self.add("The extractor output is not the expected JSON document");
                self.add("Check the extractor version and its log in the run directory");
            }

            FailureKind::ClassificationFailure => {
                self.add("An extracted prism matched neither particle A nor B");
                self.add("Check that radius and thickness match the generator settings");
            }

            FailureKind::Unexpected => {
                self.add("Rerun with -vvv for a full trace");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("terminal") || msg.contains("stdin") || msg.contains("tty") {
            self.add("Input appears to be from a terminal");
            self.add("Pass a request file or pipe one to stdin");
            return;
        }

        if msg.contains("cannot infer") || msg.contains("extension") {
            self.add("Use a .json or .toml extension, or pass --format");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            self.add("Ensure you have the required access rights");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsim::{RunFailure, RunStage};

    #[test]
    fn run_failures_get_kind_hints() {
        let failure = RunFailure::new(
            0,
            FailureKind::ExecutableNotFound,
            RunStage::ConfigWritten,
            "packgen executable not found. Please ensure it's installed and in PATH.",
        );
        let err = anyhow::Error::new(failure).context("Simulation failed");

        let hints = HintCollector::collect(&err).unwrap();
        assert!(hints.iter().any(|h| h.contains("simulation_0")));
        assert!(hints.iter().any(|h| h.contains("--packgen")));
    }

    #[test]
    fn terminal_input_falls_back_to_message_hints() {
        let err = anyhow::anyhow!("No input file specified and stdin is a terminal.");
        let hints = HintCollector::collect(&err).unwrap();
        assert!(hints[0].contains("terminal"));
    }

    #[test]
    fn unrelated_errors_have_no_hints() {
        let err = anyhow::anyhow!("something odd");
        assert!(HintCollector::collect(&err).is_none());
    }
}
