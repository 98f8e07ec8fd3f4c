//! Value types describing simulation inputs and extracted packings.
//!
//! - [`particle`] – Particle species (radius, thickness, density) and the A/B pair.
//! - [`prism`] – Extracted hexagonal prisms with derived volume and mass.
//! - [`packing`] – The classified packing aggregate and its statistics.
//! - [`results`] – Per-run results, typed run failures, and batch collections.
//! - [`types`] – Small enums shared by the above (axis, species, failure kind, run stage).
//!
//! Everything here is immutable once built. The simulation pipeline
//! produces these values from external tool output; nothing in this module
//! touches the filesystem or spawns processes.

pub mod packing;
pub mod particle;
pub mod prism;
pub mod results;
pub mod types;
