use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cutoff axis: '{0}' (expected x, y or z)")]
pub struct ParseAxisError(String);

/// Cartesian axis along which the extractor trims boundary items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

/// Which of the two configured particle species an extracted item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    A,
    B,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::A => write!(f, "A"),
            Species::B => write!(f, "B"),
        }
    }
}

/// Category of a failed run, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// An external command exited with a non-zero status.
    ProcessFailure,
    /// An external command could not be located.
    ExecutableNotFound,
    /// A command exited successfully but did not write an expected artifact.
    MissingOutputArtifact,
    /// An artifact was present but was not valid JSON or lacked required keys.
    MalformedOutput,
    /// An extracted item matched neither configured species.
    ClassificationFailure,
    /// Anything else, including failures of the worker pool itself.
    Unexpected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ProcessFailure => "ProcessFailure",
            FailureKind::ExecutableNotFound => "ExecutableNotFound",
            FailureKind::MissingOutputArtifact => "MissingOutputArtifact",
            FailureKind::MalformedOutput => "MalformedOutput",
            FailureKind::ClassificationFailure => "ClassificationFailure",
            FailureKind::Unexpected => "Unexpected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress marker of a single run through the pipeline.
///
/// Stages are ordered; a failed run reports the last stage it reached.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    #[default]
    Init,
    ConfigWritten,
    GeneratorInvoked,
    MeshProduced,
    ExtractorInvoked,
    RawJsonProduced,
    PostProcessed,
    Classified,
    Done,
}

impl RunStage {
    pub fn description(&self) -> &'static str {
        match self {
            RunStage::Init => "preparing run directory",
            RunStage::ConfigWritten => "generator configuration written",
            RunStage::GeneratorInvoked => "generator finished",
            RunStage::MeshProduced => "mesh artifacts collected",
            RunStage::ExtractorInvoked => "extractor finished",
            RunStage::RawJsonProduced => "extractor output parsed",
            RunStage::PostProcessed => "species metadata attached",
            RunStage::Classified => "items classified",
            RunStage::Done => "done",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
