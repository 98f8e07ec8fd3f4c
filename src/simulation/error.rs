//! Error types for packing simulation runs.
//!
//! This module defines the error type used throughout the simulation
//! pipeline. Errors are categorized by source: invalid requests, external
//! process failures, missing or malformed tool output, species
//! classification, and local I/O.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::particle::Particle;
use crate::model::types::FailureKind;

/// Errors that can occur while preparing or executing a packing run.
///
/// Every variant maps onto a [`FailureKind`] through [`Error::kind`], which
/// is what a [`RunFailure`](crate::RunFailure) carries once the pipeline
/// boundary has converted the error.
#[derive(Debug, Error)]
pub enum Error {
    /// The simulation request is not physically meaningful.
    #[error("invalid simulation parameter: {0}")]
    InvalidParameter(String),

    /// An external command exited with a non-zero status.
    #[error("{program} failed with {}{}", describe_code(.code), describe_streams(.stderr, .stdout))]
    Process {
        /// Program that was invoked.
        program: String,
        /// Exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
        /// Captured standard output.
        stdout: String,
    },

    /// An external command could not be located on `PATH`.
    #[error("{program} executable not found. Please ensure it's installed and in PATH.")]
    ExecutableNotFound {
        /// Program that was invoked.
        program: String,
    },

    /// A command exited successfully but did not write an expected file.
    #[error("expected output file {} was not created by {program}", path.display())]
    MissingOutput {
        /// Program that should have written the file.
        program: String,
        /// The missing artifact.
        path: PathBuf,
    },

    /// A tool output file exists but could not be interpreted.
    #[error("failed to parse output {}: {detail}", path.display())]
    MalformedOutput {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        detail: String,
    },

    /// An extracted item matches neither configured species.
    #[error(
        "prism {index} (radius {radius}, thickness {thickness}) does not match either particle A {a:?} or B {b:?}"
    )]
    Classification {
        /// Position of the item in the extractor output.
        index: usize,
        /// Radius reported by the extractor.
        radius: f64,
        /// Thickness reported by the extractor.
        thickness: f64,
        /// Configured species A.
        a: Particle,
        /// Configured species B, if any.
        b: Option<Particle>,
    },

    /// Local filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read, written, or created.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl Error {
    /// The failure category reported for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Process { .. } => FailureKind::ProcessFailure,
            Error::ExecutableNotFound { .. } => FailureKind::ExecutableNotFound,
            Error::MissingOutput { .. } => FailureKind::MissingOutputArtifact,
            Error::MalformedOutput { .. } => FailureKind::MalformedOutput,
            Error::Classification { .. } => FailureKind::ClassificationFailure,
            Error::InvalidParameter(_) | Error::Io { .. } | Error::ThreadPool(_) => {
                FailureKind::Unexpected
            }
        }
    }

    /// Creates a [`Process`](Error::Process) error, trimming captured streams.
    pub fn process(
        program: impl Into<String>,
        code: Option<i32>,
        stderr: &str,
        stdout: &str,
    ) -> Self {
        Self::Process {
            program: program.into(),
            code,
            stderr: stderr.trim().to_string(),
            stdout: stdout.trim().to_string(),
        }
    }

    /// Creates a [`MalformedOutput`](Error::MalformedOutput) error.
    pub fn malformed(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::MalformedOutput {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Creates an [`Io`](Error::Io) error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidParameter(detail.into())
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("return code {c}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn describe_streams(stderr: &str, stdout: &str) -> String {
    let mut text = String::new();
    if !stderr.is_empty() {
        text.push_str(". stderr: ");
        text.push_str(stderr);
    }
    if !stdout.is_empty() {
        text.push_str(". stdout: ");
        text.push_str(stdout);
    }
    text
}
