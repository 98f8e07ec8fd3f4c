//! Orchestration of particle-packing simulations built from two external tools:
//! a packing generator (`packgen`) that fills a box with hexagonal prisms, and a
//! scripting-engine extractor that turns the resulting mesh into packing statistics.
//!
//! # Features
//!
//! - **Isolated runs**: each run owns its own `simulation_<i>` directory, so
//!   any number of runs can execute side by side
//! - **Typed failures**: process errors, missing tools, missing or malformed
//!   output and classification mismatches are reported per run, never raised
//! - **Species classification**: every extracted prism is matched to species A
//!   or B by geometry, and the realised mass fraction of B is derived
//! - **Batches**: `n` runs on a worker pool with deterministic result ordering
//!
//! # Quick Start
//!
//! ```no_run
//! use packsim::{ExtractionOptions, PackingSimulation, Particle, SimulationParams};
//!
//! let params = SimulationParams {
//!     particle_b: Some(Particle::new(0.5, 0.1, 1.2)),
//!     mass_fraction_b: 0.1,
//!     num_cubes_xy: 3,
//!     num_cubes_z: 9,
//!     box_length: 10.0,
//!     ..SimulationParams::new(Particle::new(1.0, 0.2, 1.0))
//! };
//!
//! let sim = PackingSimulation::new(params, "runs")?;
//! let batch = sim.run_batch(&ExtractionOptions::default(), 4);
//!
//! for result in &batch.successful {
//!     let packing = &result.extracted_packing;
//!     println!(
//!         "{}: {} prisms, filling fraction {:.3}, mass fraction B {:.3}",
//!         result.workdir.display(),
//!         packing.item_count(),
//!         packing.volumetric_filling_fraction(),
//!         packing.actual_mass_fraction_b(),
//!     );
//! }
//! for failure in &batch.failures {
//!     eprintln!("{failure}");
//! }
//! # Ok::<(), packsim::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`]: Request documents (JSON/TOML) and the JSON report envelope
//! - [`PackingSimulation`]: Single runs and batches
//! - [`Invoker`]: The seam through which external commands are run
//!
//! # Data Types
//!
//! ## Inputs
//!
//! - [`Particle`]: One species (radius, thickness, density)
//! - [`SimulationParams`]: Species, requested mass fraction, lattice, box length
//! - [`ExtractionOptions`]: Cutoff distance and axis, outlier handling
//! - [`Toolchain`]: Generator and extractor program names
//!
//! ## Outputs
//!
//! - [`RunResult`]: Everything one successful run produced
//! - [`ExtractedPacking`]: Classified prisms with aggregate statistics
//! - [`HexagonalPrism`]: One extracted item with derived volume and mass
//! - [`RunFailure`]: A failed run with its [`FailureKind`] and [`RunStage`]
//! - [`BatchResults`]: Successes and failures of a batch

mod model;
mod simulation;

pub mod io;

pub use model::packing::{
    AlignmentStats, BoundingBox, BoxDimensions, ExtractedPacking, PackingStatistics, PerAxis,
};
pub use model::particle::{Particle, ParticleSet};
pub use model::prism::{
    FaceRotation, HexagonalPrism, PrismGeometry, TriangulatedSurface, prism_volume,
};
pub use model::results::{
    BatchResults, RUN_DIR_PREFIX, RunFailure, RunResult, run_dir_name, run_index_from_dir,
};
pub use model::types::{Axis, FailureKind, ParseAxisError, RunStage, Species};

pub use simulation::{
    ABSOLUTE_TOLERANCE, CapturedOutput, Error, ExtractionOptions, Invocation, Invoker,
    PackgenConfig, PackingSimulation, RELATIVE_TOLERANCE, SimulationParams, SystemInvoker,
    Toolchain, classify, execute, is_close, read_echo as read_packgen_echo,
};
