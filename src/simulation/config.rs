//! Configuration types for packing simulations.
//!
//! - [`SimulationParams`]: The run request: species, lattice, box length
//! - [`ExtractionOptions`]: Cutoff and outlier settings passed to the extractor
//! - [`Toolchain`]: Names or paths of the two external programs

use crate::model::packing::BoxDimensions;
use crate::model::particle::{Particle, ParticleSet};
use crate::model::types::Axis;

use super::error::Error;

/// Parameters of a packing run.
///
/// # Examples
///
/// ```
/// use packsim::{Particle, SimulationParams};
///
/// let params = SimulationParams {
///     num_cubes_xy: 2,
///     num_cubes_z: 10,
///     box_length: 10.0,
///     ..SimulationParams::new(Particle::new(1.0, 0.2, 1.0))
/// };
///
/// assert_eq!(params.distance(), 5.0);
/// assert_eq!(params.box_dimensions().lz, 50.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Species A. Always present.
    pub particle_a: Particle,

    /// Species B, or `None` for a single-species packing.
    pub particle_b: Option<Particle>,

    /// Requested mass fraction of species B in `[0, 1]`.
    pub mass_fraction_b: f64,

    /// Lattice cells along x and along y.
    pub num_cubes_xy: u32,

    /// Lattice cells along z.
    pub num_cubes_z: u32,

    /// Edge length `L` of the box in x and y.
    pub box_length: f64,
}

impl SimulationParams {
    /// A single-species request on a 1×1×1 lattice with unit box length.
    pub fn new(particle_a: Particle) -> Self {
        Self {
            particle_a,
            particle_b: None,
            mass_fraction_b: 0.0,
            num_cubes_xy: 1,
            num_cubes_z: 1,
            box_length: 1.0,
        }
    }

    /// Spacing between lattice sites, `L / num_cubes_xy`.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.box_length / f64::from(self.num_cubes_xy)
    }

    /// Box edges handed to the generator: `Lx = Ly = L`, `Lz` is the lattice
    /// spacing times the vertical cell count.
    pub fn box_dimensions(&self) -> BoxDimensions {
        BoxDimensions {
            lx: self.box_length,
            ly: self.box_length,
            lz: self.distance() * f64::from(self.num_cubes_z),
        }
    }

    #[inline]
    pub fn particles(&self) -> ParticleSet {
        ParticleSet::new(self.particle_a, self.particle_b)
    }

    /// Rejects requests that the generator cannot turn into a packing.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.particle_a.is_physical() {
            return Err(Error::invalid(format!(
                "particle A must have finite, positive radius, thickness and density (got {:?})",
                self.particle_a
            )));
        }
        if let Some(b) = &self.particle_b {
            if !b.is_physical() {
                return Err(Error::invalid(format!(
                    "particle B must have finite, positive radius, thickness and density (got {b:?})"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.mass_fraction_b) {
            return Err(Error::invalid(format!(
                "mass_fraction_B must lie in [0, 1] (got {})",
                self.mass_fraction_b
            )));
        }
        if self.num_cubes_xy == 0 || self.num_cubes_z == 0 {
            return Err(Error::invalid(format!(
                "lattice counts must be at least 1 (got {}x{}x{})",
                self.num_cubes_xy, self.num_cubes_xy, self.num_cubes_z
            )));
        }
        if !(self.box_length.is_finite() && self.box_length > 0.0) {
            return Err(Error::invalid(format!(
                "L must be finite and positive (got {})",
                self.box_length
            )));
        }
        Ok(())
    }
}

/// Settings for the extraction step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionOptions {
    /// Trimming distance applied at the box boundary.
    pub cutoff: f64,

    /// Axis along which `cutoff` is applied.
    pub cutoff_direction: Axis,

    /// Drop items whose z-range marks them as outliers.
    pub remove_outlier_range_z: bool,

    pub outlier_z_threshold: f64,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            cutoff: 0.1,
            cutoff_direction: Axis::X,
            remove_outlier_range_z: true,
            outlier_z_threshold: 0.0,
        }
    }
}

impl ExtractionOptions {
    pub fn new(cutoff: f64, cutoff_direction: Axis) -> Self {
        Self {
            cutoff,
            cutoff_direction,
            ..Default::default()
        }
    }
}

/// External programs invoked by a run.
///
/// Each entry is either a bare name resolved through `PATH` or a path to
/// the executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub packgen: String,
    pub matlab: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            packgen: "packgen".to_string(),
            matlab: "matlab".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_species() -> SimulationParams {
        SimulationParams {
            particle_b: Some(Particle::new(0.5, 0.1, 1.2)),
            mass_fraction_b: 0.1,
            num_cubes_xy: 3,
            num_cubes_z: 9,
            box_length: 10.0,
            ..SimulationParams::new(Particle::new(1.0, 0.2, 1.0))
        }
    }

    #[test]
    fn distance_times_cells_recovers_box_length() {
        let params = two_species();
        assert_relative_eq!(
            params.distance() * f64::from(params.num_cubes_xy),
            params.box_length,
            epsilon = 1e-12
        );
    }

    #[test]
    fn box_dimensions_scale_z_by_lattice_spacing() {
        let dims = two_species().box_dimensions();
        assert_eq!(dims.lx, 10.0);
        assert_eq!(dims.ly, 10.0);
        assert_relative_eq!(dims.lz, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn valid_request_passes() {
        assert!(two_species().validate().is_ok());
        assert!(SimulationParams::new(Particle::new(1.0, 0.2, 1.0)).validate().is_ok());
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let mut p = two_species();
        p.mass_fraction_b = 1.5;
        assert!(matches!(p.validate(), Err(Error::InvalidParameter(_))));

        let mut p = two_species();
        p.num_cubes_xy = 0;
        assert!(p.validate().is_err());

        let mut p = two_species();
        p.box_length = -1.0;
        assert!(p.validate().is_err());

        let mut p = two_species();
        p.particle_b = Some(Particle::new(0.5, 0.0, 1.2));
        assert!(p.validate().is_err());

        let mut p = two_species();
        p.particle_a.density = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn default_extraction_options() {
        let opts = ExtractionOptions::default();
        assert_eq!(opts.cutoff, 0.1);
        assert_eq!(opts.cutoff_direction, Axis::X);
        assert!(opts.remove_outlier_range_z);
        assert_eq!(opts.outlier_z_threshold, 0.0);
    }

    #[test]
    fn default_toolchain_uses_path_lookup() {
        let tools = Toolchain::default();
        assert_eq!(tools.packgen, "packgen");
        assert_eq!(tools.matlab, "matlab");
    }
}
