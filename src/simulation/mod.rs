mod batch;
mod classify;
mod config;
mod error;
mod extractor;
mod invoke;
mod packgen;
mod raw;

pub use classify::{ABSOLUTE_TOLERANCE, RELATIVE_TOLERANCE, classify, is_close};
pub use config::{ExtractionOptions, SimulationParams, Toolchain};
pub use error::Error;
pub use invoke::{CapturedOutput, Invocation, Invoker, SystemInvoker, execute};
pub use packgen::{PackgenConfig, read_echo};

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::model::packing::ExtractedPacking;
use crate::model::results::{RunFailure, RunResult, run_dir_name};
use crate::model::types::{FailureKind, RunStage};

/// A configured packing simulation rooted at a working directory.
///
/// Each run `i` owns `<workdir>/simulation_<i>` exclusively; runs with
/// distinct indices never touch each other's files, so any number of them
/// can execute concurrently.
#[derive(Debug, Clone)]
pub struct PackingSimulation {
    params: SimulationParams,
    workdir: PathBuf,
    toolchain: Toolchain,
    invoker: Arc<dyn Invoker>,
    threads: Option<usize>,
}

impl PackingSimulation {
    /// Validates `params` and creates `workdir` (with parents) if needed.
    ///
    /// The working directory is stored in absolute form because both
    /// external tools run with a per-run directory as their cwd.
    pub fn new(params: SimulationParams, workdir: impl AsRef<Path>) -> Result<Self, Error> {
        params.validate()?;

        let workdir = workdir.as_ref();
        fs::create_dir_all(workdir).map_err(|e| Error::io(workdir, e))?;
        let workdir = fs::canonicalize(workdir).map_err(|e| Error::io(workdir, e))?;

        Ok(Self {
            params,
            workdir,
            toolchain: Toolchain::default(),
            invoker: Arc::new(SystemInvoker),
            threads: None,
        })
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Replaces the process runner used for both external tools.
    pub fn with_invoker(mut self, invoker: impl Invoker + 'static) -> Self {
        self.invoker = Arc::new(invoker);
        self
    }

    /// Caps the worker pool used by [`run_parallel`](Self::run_parallel).
    /// `None` sizes the pool to `min(n, logical CPUs)`.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.filter(|&t| t > 0);
        self
    }

    #[inline]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    #[inline]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[inline]
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Directory owned by run `index`.
    pub fn run_dir(&self, index: usize) -> PathBuf {
        self.workdir.join(run_dir_name(index))
    }

    /// Executes run `index` end to end.
    ///
    /// Never panics and never returns a raw [`Error`]: every failure,
    /// including a panic inside the pipeline, comes back as a
    /// [`RunFailure`] tagged with `index` and the last stage reached.
    pub fn run(&self, options: &ExtractionOptions, index: usize) -> Result<RunResult, RunFailure> {
        let mut stage = RunStage::Init;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_stages(options, index, &mut stage)
        }));

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    "simulation {index} finished with {} items",
                    result.extracted_packing.item_count()
                );
                Ok(result)
            }
            Ok(Err(err)) => {
                let failure = RunFailure::new(index, err.kind(), stage, err.to_string());
                warn!("{failure} (after: {stage})");
                Err(failure)
            }
            Err(payload) => {
                let failure = RunFailure::new(
                    index,
                    FailureKind::Unexpected,
                    stage,
                    format!("run panicked: {}", panic_message(payload.as_ref())),
                );
                warn!("{failure}");
                Err(failure)
            }
        }
    }

    fn run_stages(
        &self,
        options: &ExtractionOptions,
        index: usize,
        stage: &mut RunStage,
    ) -> Result<RunResult, Error> {
        let dir = self.run_dir(index);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let config = packgen::PackgenConfig::from_params(&self.params).write(&dir)?;
        advance(stage, RunStage::ConfigWritten, index);

        let generator = packgen::invocation(&self.toolchain.packgen, &dir, &config);
        execute(self.invoker.as_ref(), &generator)?;
        advance(stage, RunStage::GeneratorInvoked, index);

        let artifacts = packgen::collect_artifacts(&self.toolchain.packgen, &dir)?;
        advance(stage, RunStage::MeshProduced, index);

        let extraction = extractor::invocation(
            &self.toolchain.matlab,
            &artifacts.stl_path,
            options,
            self.params.box_length,
        );
        execute(self.invoker.as_ref(), &extraction)?;
        advance(stage, RunStage::ExtractorInvoked, index);

        let raw = extractor::read_output(&extractor::output_path(&artifacts.stl_path))?;
        advance(stage, RunStage::RawJsonProduced, index);

        let particles = self.params.particles();
        let (items, statistics) = raw.into_parts();
        advance(stage, RunStage::PostProcessed, index);

        let prisms = classify::classify_items(items, &particles)?;
        advance(stage, RunStage::Classified, index);

        let packing =
            ExtractedPacking::new(prisms, statistics, particles, self.params.box_dimensions());
        advance(stage, RunStage::Done, index);

        Ok(RunResult {
            particle_a: self.params.particle_a,
            particle_b: self.params.particle_b,
            mass_fraction_b: self.params.mass_fraction_b,
            num_cubes_xy: self.params.num_cubes_xy,
            num_cubes_z: self.params.num_cubes_z,
            box_length: self.params.box_length,
            workdir: dir,
            cutoff: options.cutoff,
            cutoff_direction: options.cutoff_direction,
            stl_path: artifacts.stl_path,
            blender_path: artifacts.blender_path,
            packgen_json_path: artifacts.packgen_json_path,
            extracted_packing: packing,
        })
    }
}

fn advance(stage: &mut RunStage, next: RunStage, index: usize) {
    debug!("simulation {index}: {next}");
    *stage = next;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
