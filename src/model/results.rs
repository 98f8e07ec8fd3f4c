use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use super::packing::ExtractedPacking;
use super::particle::Particle;
use super::types::{Axis, FailureKind, RunStage};

/// Prefix of every per-run working directory (`simulation_<index>`).
pub const RUN_DIR_PREFIX: &str = "simulation_";

/// Name of the working directory owned by run `index`.
pub fn run_dir_name(index: usize) -> String {
    format!("{RUN_DIR_PREFIX}{index}")
}

/// Recovers the run index from a directory named by [`run_dir_name`].
pub fn run_index_from_dir(dir: &Path) -> Option<usize> {
    dir.file_name()?
        .to_str()?
        .strip_prefix(RUN_DIR_PREFIX)?
        .parse()
        .ok()
}

/// Everything produced by one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    #[serde(rename = "particleA")]
    pub particle_a: Particle,
    #[serde(rename = "particleB")]
    pub particle_b: Option<Particle>,
    #[serde(rename = "mass_fraction_B")]
    pub mass_fraction_b: f64,
    pub num_cubes_xy: u32,
    pub num_cubes_z: u32,
    #[serde(rename = "L")]
    pub box_length: f64,
    pub workdir: PathBuf,
    pub cutoff: f64,
    pub cutoff_direction: Axis,
    pub stl_path: PathBuf,
    pub blender_path: PathBuf,
    pub packgen_json_path: PathBuf,
    pub extracted_packing: ExtractedPacking,
}

impl RunResult {
    /// Index of the run that produced this result, derived from its
    /// working directory name.
    pub fn run_index(&self) -> Option<usize> {
        run_index_from_dir(&self.workdir)
    }
}

/// A run that did not produce a result.
///
/// `index` is `None` when the failure came from the worker pool rather
/// than from a specific run; it serialises as `-1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunFailure {
    #[serde(rename = "simulation_index", serialize_with = "serialize_index")]
    pub index: Option<usize>,
    #[serde(rename = "error_message")]
    pub message: String,
    #[serde(rename = "error_type")]
    pub kind: FailureKind,
    pub stage: RunStage,
}

impl RunFailure {
    pub fn new(index: usize, kind: FailureKind, stage: RunStage, message: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            message: message.into(),
            kind,
            stage,
        }
    }

    /// A failure of the pool mechanism that cannot be attributed to one run.
    pub fn pool(message: impl Into<String>) -> Self {
        Self {
            index: None,
            message: message.into(),
            kind: FailureKind::Unexpected,
            stage: RunStage::Init,
        }
    }

    #[inline]
    pub fn is_pool_failure(&self) -> bool {
        self.index.is_none()
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "simulation {} failed ({}): {}", i, self.kind, self.message),
            None => write!(f, "worker pool failure ({}): {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for RunFailure {}

fn serialize_index<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    match index {
        Some(i) => serializer.serialize_i64(*i as i64),
        None => serializer.serialize_i64(-1),
    }
}

/// Outcome of a batch: successes in run-index order, failures as collected.
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    pub successful: Vec<RunResult>,
    pub failures: Vec<RunFailure>,
    pub total_requested: usize,
}

impl BatchResults {
    pub fn new(total_requested: usize) -> Self {
        Self {
            successful: Vec::with_capacity(total_requested),
            failures: Vec::new(),
            total_requested,
        }
    }

    pub fn record(&mut self, outcome: Result<RunResult, RunFailure>) {
        match outcome {
            Ok(result) => self.successful.push(result),
            Err(failure) => self.failures.push(failure),
        }
    }

    /// Orders successful results by the run index encoded in their working
    /// directory. Results without a recognisable index sort first.
    pub fn sort_successful(&mut self) {
        self.successful.sort_by_key(|r| r.run_index().unwrap_or(0));
    }

    #[inline]
    pub fn successful_count(&self) -> usize {
        self.successful.len()
    }

    #[inline]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    #[inline]
    pub fn collected(&self) -> usize {
        self.successful.len() + self.failures.len()
    }

    /// `true` when nothing succeeded.
    #[inline]
    pub fn all_failed(&self) -> bool {
        self.successful.is_empty()
    }
}
