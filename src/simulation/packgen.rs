//! Generator stage: configuration file, command, and artifact collection.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::config::SimulationParams;
use super::error::Error;
use super::invoke::Invocation;

pub const CONFIG_BASENAME: &str = "parameters";
pub const OUTPUT_PREFIX: &str = "packing";

/// Placeholder written for every species-B field when B is absent; the
/// generator rejects zeros.
const ABSENT_SPECIES_PLACEHOLDER: f64 = 1.0;

/// Input document of the packing generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackgenConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    pub scale: u32,
    #[serde(rename = "r_B")]
    pub r_b: f64,
    #[serde(rename = "r_A")]
    pub r_a: f64,
    #[serde(rename = "thickness_B")]
    pub thickness_b: f64,
    #[serde(rename = "thickness_A")]
    pub thickness_a: f64,
    #[serde(rename = "density_B")]
    pub density_b: f64,
    #[serde(rename = "density_A")]
    pub density_a: f64,
    #[serde(rename = "mass_fraction_B")]
    pub mass_fraction_b: f64,
    pub num_cubes_x: u32,
    pub num_cubes_y: u32,
    pub num_cubes_z: u32,
    pub num_sides: u32,
    pub distance: f64,
    pub quit_on_finish: bool,
}

impl PackgenConfig {
    pub fn from_params(params: &SimulationParams) -> Self {
        let a = &params.particle_a;
        let (r_b, thickness_b, density_b) = match &params.particle_b {
            Some(b) => (b.radius, b.thickness, b.density),
            None => (
                ABSENT_SPECIES_PLACEHOLDER,
                ABSENT_SPECIES_PLACEHOLDER,
                ABSENT_SPECIES_PLACEHOLDER,
            ),
        };

        Self {
            seed: None,
            scale: 1,
            r_b,
            r_a: a.radius,
            thickness_b,
            thickness_a: a.thickness,
            density_b,
            density_a: a.density,
            mass_fraction_b: params.mass_fraction_b,
            num_cubes_x: params.num_cubes_xy,
            num_cubes_y: params.num_cubes_xy,
            num_cubes_z: params.num_cubes_z,
            num_sides: 6,
            distance: params.distance(),
            quit_on_finish: true,
        }
    }

    /// Writes the configuration as 4-space indented JSON to
    /// `<dir>/parameters.json` and returns the path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, Error> {
        let path = config_path(dir);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| Error::io(&path, std::io::Error::other(e)))?;

        fs::write(&path, buf).map_err(|e| Error::io(&path, e))?;
        debug!("wrote generator configuration {}", path.display());
        Ok(path)
    }
}

/// Files the generator leaves in a run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackgenArtifacts {
    pub stl_path: PathBuf,
    pub blender_path: PathBuf,
    pub packgen_json_path: PathBuf,
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(format!("{CONFIG_BASENAME}.json"))
}

fn artifact(dir: &Path, extension: &str) -> PathBuf {
    dir.join(format!("{OUTPUT_PREFIX}_{CONFIG_BASENAME}.{extension}"))
}

/// Generator command for the configuration at `config`, run inside `dir`.
///
/// Only the mesh is required; the echo and the visualization file are
/// reported but not checked.
pub fn invocation(program: &str, dir: &Path, config: &Path) -> Invocation {
    Invocation::new(program, dir)
        .arg("--")
        .arg(config.to_string_lossy())
        .expects(artifact(dir, "stl"))
}

/// Locates the generator output in `dir`, renaming a visualization file
/// written as `.blender` to `.blend`.
pub fn collect_artifacts(program: &str, dir: &Path) -> Result<PackgenArtifacts, Error> {
    let stl_path = artifact(dir, "stl");
    if !stl_path.is_file() {
        return Err(Error::MissingOutput {
            program: program.to_string(),
            path: stl_path,
        });
    }

    let blender_path = artifact(dir, "blend");
    let misnamed = artifact(dir, "blender");
    if misnamed.is_file() {
        warn!(
            "renaming visualization file {} to {}",
            misnamed.display(),
            blender_path.display()
        );
        fs::rename(&misnamed, &blender_path).map_err(|e| Error::io(&misnamed, e))?;
    }

    Ok(PackgenArtifacts {
        stl_path,
        blender_path,
        packgen_json_path: artifact(dir, "json"),
    })
}

/// Reads back the configuration the generator echoed after resolving it.
pub fn read_echo(path: &Path) -> Result<PackgenConfig, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::malformed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::particle::Particle;
    use approx::assert_relative_eq;

    fn single_species() -> SimulationParams {
        SimulationParams {
            num_cubes_xy: 2,
            num_cubes_z: 10,
            box_length: 10.0,
            ..SimulationParams::new(Particle::new(1.0, 0.2, 1.0))
        }
    }

    #[test]
    fn absent_species_b_gets_placeholder_values() {
        let config = PackgenConfig::from_params(&single_species());

        assert_eq!(config.r_b, 1.0);
        assert_eq!(config.thickness_b, 1.0);
        assert_eq!(config.density_b, 1.0);
        assert_eq!(config.mass_fraction_b, 0.0);
        assert_eq!(config.r_a, 1.0);
        assert_eq!(config.thickness_a, 0.2);
        assert_eq!(config.num_sides, 6);
        assert_eq!(config.scale, 1);
        assert!(config.quit_on_finish);
        assert!(config.seed.is_none());
    }

    #[test]
    fn lattice_and_distance_follow_request() {
        let params = SimulationParams {
            particle_b: Some(Particle::new(0.5, 0.1, 1.2)),
            mass_fraction_b: 0.1,
            num_cubes_xy: 3,
            num_cubes_z: 9,
            ..single_species()
        };
        let config = PackgenConfig::from_params(&params);

        assert_eq!(config.num_cubes_x, 3);
        assert_eq!(config.num_cubes_y, 3);
        assert_eq!(config.num_cubes_z, 9);
        assert_eq!(config.r_b, 0.5);
        assert_eq!(config.density_b, 1.2);
        assert_relative_eq!(config.distance * f64::from(config.num_cubes_x), 10.0);
    }

    #[test]
    fn written_config_uses_generator_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = PackgenConfig::from_params(&single_species())
            .write(dir.path())
            .unwrap();

        assert_eq!(path, dir.path().join("parameters.json"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"seed\": null"));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        for key in [
            "seed",
            "scale",
            "r_A",
            "r_B",
            "thickness_A",
            "thickness_B",
            "density_A",
            "density_B",
            "mass_fraction_B",
            "num_cubes_x",
            "num_cubes_y",
            "num_cubes_z",
            "num_sides",
            "distance",
            "quit_on_finish",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["distance"], 5.0);
    }

    #[test]
    fn echo_reads_back_written_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = PackgenConfig::from_params(&single_species());
        let path = config.write(dir.path()).unwrap();

        assert_eq!(read_echo(&path).unwrap(), config);
    }

    #[test]
    fn invocation_passes_config_after_separator() {
        let dir = Path::new("/work/simulation_0");
        let inv = invocation("packgen", dir, &config_path(dir));

        assert_eq!(inv.args, vec!["--", "/work/simulation_0/parameters.json"]);
        assert_eq!(inv.cwd, dir);
        assert_eq!(
            inv.expected_outputs,
            vec![PathBuf::from("/work/simulation_0/packing_parameters.stl")]
        );
    }

    #[test]
    fn collect_renames_misnamed_visualization_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("packing_parameters.stl"), "solid").unwrap();
        fs::write(dir.path().join("packing_parameters.blender"), "blend").unwrap();

        let artifacts = collect_artifacts("packgen", dir.path()).unwrap();

        assert!(artifacts.blender_path.is_file());
        assert!(!dir.path().join("packing_parameters.blender").exists());
        assert_eq!(
            artifacts.packgen_json_path,
            dir.path().join("packing_parameters.json")
        );
    }

    #[test]
    fn collect_requires_mesh() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_artifacts("packgen", dir.path()),
            Err(Error::MissingOutput { .. })
        ));
    }

    #[test]
    fn malformed_echo_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packing_parameters.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(read_echo(&path), Err(Error::MalformedOutput { .. })));
    }
}
