use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::model::particle::Particle;
use crate::model::types::Axis;
use crate::simulation::{ExtractionOptions, SimulationParams, Toolchain};

/// One species as written in a request document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleInput {
    pub radius: f64,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    pub density: f64,
}

impl From<ParticleInput> for Particle {
    fn from(p: ParticleInput) -> Self {
        Particle::new(p.radius, p.thickness, p.density)
    }
}

/// A simulation request document.
///
/// Key names follow the external convention (`particle_A`, `L`, ...).
/// Optional keys fall back to the documented defaults; tool and thread
/// overrides are absent unless given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    #[serde(rename = "particle_A")]
    pub particle_a: ParticleInput,

    #[serde(rename = "particle_B", default)]
    pub particle_b: Option<ParticleInput>,

    #[serde(rename = "mass_fraction_B", default)]
    pub mass_fraction_b: f64,

    pub num_cubes_xy: u32,
    pub num_cubes_z: u32,

    #[serde(rename = "L")]
    pub box_length: f64,

    pub work_dir: PathBuf,

    #[serde(default = "default_cutoff")]
    pub cutoff: f64,

    #[serde(default)]
    pub cutoff_direction: Axis,

    #[serde(default = "default_runs")]
    pub n: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packgen: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matlab: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

fn default_thickness() -> f64 {
    1.0
}

fn default_cutoff() -> f64 {
    ExtractionOptions::default().cutoff
}

fn default_runs() -> usize {
    1
}

impl SimulationInput {
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            particle_a: self.particle_a.into(),
            particle_b: self.particle_b.map(Particle::from),
            mass_fraction_b: self.mass_fraction_b,
            num_cubes_xy: self.num_cubes_xy,
            num_cubes_z: self.num_cubes_z,
            box_length: self.box_length,
        }
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions::new(self.cutoff, self.cutoff_direction)
    }

    /// Tool names from the document, falling back to the defaults.
    pub fn toolchain(&self) -> Toolchain {
        let defaults = Toolchain::default();
        Toolchain {
            packgen: self.packgen.clone().unwrap_or(defaults.packgen),
            matlab: self.matlab.clone().unwrap_or(defaults.matlab),
        }
    }

    /// `work_dir` resolved against `base` (the input file's directory, or
    /// the current directory for stdin). Absolute paths are kept as is.
    pub fn resolve_workdir(&self, base: &Path) -> PathBuf {
        base.join(&self.work_dir)
    }

    /// Checks the parts of the document that are not run parameters.
    pub fn validate(&self) -> Result<(), Error> {
        if self.n == 0 {
            return Err(Error::invalid("n must be at least 1"));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(Error::invalid("work_dir must not be empty"));
        }
        if !(self.cutoff.is_finite() && self.cutoff >= 0.0) {
            return Err(Error::invalid(format!(
                "cutoff must be finite and non-negative (got {})",
                self.cutoff
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::invalid("threads must be at least 1"));
        }
        Ok(())
    }
}
