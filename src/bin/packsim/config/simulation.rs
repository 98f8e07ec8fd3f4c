use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use packsim::io::SimulationInput;
use packsim::{ExtractionOptions, SimulationParams, Toolchain};

use crate::cli::{RunOptions, ToolOptions};

/// A request document merged with command-line overrides.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub params: SimulationParams,
    pub options: ExtractionOptions,
    pub toolchain: Toolchain,
    pub workdir: PathBuf,
    pub runs: usize,
    pub threads: Option<usize>,
}

/// Command-line values win over the document; `work_dir` is resolved
/// against `base`.
pub fn build_run_plan(
    input: &SimulationInput,
    run: &RunOptions,
    tools: &ToolOptions,
    base: &Path,
) -> Result<RunPlan> {
    input.validate().context("Invalid simulation request")?;

    let mut options = input.extraction_options();
    if let Some(cutoff) = run.cutoff {
        if !(cutoff.is_finite() && cutoff >= 0.0) {
            bail!("--cutoff must be finite and non-negative (got {})", cutoff);
        }
        options.cutoff = cutoff;
    }
    if let Some(axis) = run.cutoff_direction {
        options.cutoff_direction = axis.into();
    }

    let mut toolchain = input.toolchain();
    if let Some(packgen) = &tools.packgen {
        toolchain.packgen = packgen.clone();
    }
    if let Some(matlab) = &tools.matlab {
        toolchain.matlab = matlab.clone();
    }

    Ok(RunPlan {
        params: input.params(),
        options,
        toolchain,
        workdir: input.resolve_workdir(base),
        runs: run.runs.map_or(input.n, |n| n as usize),
        threads: run.threads.map(|t| t as usize).or(input.threads),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CutoffAxis;
    use packsim::Axis;

    fn request() -> SimulationInput {
        serde_json::from_value(serde_json::json!({
            "particle_A": {"radius": 1.0, "thickness": 0.2, "density": 1.0},
            "num_cubes_xy": 2,
            "num_cubes_z": 10,
            "L": 10.0,
            "work_dir": "runs",
            "n": 2,
            "threads": 2,
            "cutoff": 0.3
        }))
        .unwrap()
    }

    fn no_overrides() -> (RunOptions, ToolOptions) {
        (
            RunOptions {
                runs: None,
                threads: None,
                cutoff: None,
                cutoff_direction: None,
            },
            ToolOptions {
                packgen: None,
                matlab: None,
            },
        )
    }

    #[test]
    fn document_values_are_used_without_overrides() {
        let (run, tools) = no_overrides();
        let plan = build_run_plan(&request(), &run, &tools, Path::new("/data")).unwrap();

        assert_eq!(plan.runs, 2);
        assert_eq!(plan.threads, Some(2));
        assert_eq!(plan.options.cutoff, 0.3);
        assert_eq!(plan.options.cutoff_direction, Axis::X);
        assert_eq!(plan.toolchain, Toolchain::default());
        assert_eq!(plan.workdir, PathBuf::from("/data/runs"));
    }

    #[test]
    fn command_line_overrides_win() {
        let (mut run, mut tools) = no_overrides();
        run.runs = Some(5);
        run.threads = Some(1);
        run.cutoff = Some(0.0);
        run.cutoff_direction = Some(CutoffAxis::Z);
        tools.packgen = Some("/opt/packgen/bin/packgen".to_string());

        let plan = build_run_plan(&request(), &run, &tools, Path::new("/data")).unwrap();

        assert_eq!(plan.runs, 5);
        assert_eq!(plan.threads, Some(1));
        assert_eq!(plan.options.cutoff, 0.0);
        assert_eq!(plan.options.cutoff_direction, Axis::Z);
        assert_eq!(plan.toolchain.packgen, "/opt/packgen/bin/packgen");
        assert_eq!(plan.toolchain.matlab, "matlab");
    }

    #[test]
    fn negative_cutoff_override_is_rejected() {
        let (mut run, tools) = no_overrides();
        run.cutoff = Some(-1.0);
        assert!(build_run_plan(&request(), &run, &tools, Path::new("/data")).is_err());
    }
}
