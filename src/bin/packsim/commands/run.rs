use anyhow::{Context, Result, anyhow, bail};
use log::info;

use packsim::io::{Format, Report, SimulationInput, read_input, write_report};
use packsim::{BatchResults, PackingSimulation};

use crate::cli::Cli;
use crate::config::{RunPlan, build_run_plan};
use crate::display::{
    BatchProgress, Context as DisplayContext, Progress, print_request_summary, print_run_outcomes,
};
use crate::io::{create_output, infer_input_format, input_base_dir, open_input, stdin_is_tty};
use crate::util::text::plural;

const TOTAL_STEPS: u8 = 3;

/// How the command ended once the report was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The report was written but no run succeeded.
    AllFailed,
}

pub fn run_simulation(cli: Cli, ctx: DisplayContext) -> Result<Outcome> {
    if cli.input.is_none() && stdin_is_tty() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: packsim <INPUT> or pipe a request via stdin."
        );
    }

    let format = resolve_input_format(&cli)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading request");
    let input = read_request(&cli, format)?;
    let base = input_base_dir(cli.input.as_deref())?;
    let plan = build_run_plan(&input, &cli.run, &cli.tools, &base)?;

    let read_substeps = [
        format!("Parse {} document", format),
        format!("Prepare {}", plan.workdir.display()),
    ];
    let read_substeps_ref: Vec<&str> = read_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Reading request", &read_substeps_ref);

    if ctx.interactive {
        print_request_summary(&plan);
    }

    let sim = PackingSimulation::new(plan.params.clone(), &plan.workdir)
        .context("Failed to set up simulation")?
        .with_toolchain(plan.toolchain.clone())
        .with_threads(plan.threads);

    let step = format!("Running {}", plural(plan.runs, "simulation"));
    progress.step(&step);
    let batch = execute(&sim, &plan, ctx, &mut progress);

    let run_substeps = build_run_substeps(&batch);
    let run_substeps_ref: Vec<&str> = run_substeps.iter().map(|s| s.as_str()).collect();
    if batch.all_failed() {
        progress.fail_step(&step, &run_substeps_ref);
    } else {
        progress.complete_step(&step, &run_substeps_ref);
    }

    if ctx.interactive {
        print_run_outcomes(&batch);
    }

    progress.step("Writing report");
    let report = Report::from_batch(&batch);
    let writer = create_output(cli.output.as_deref())?;
    write_report(writer, &report, Format::Json).context("Failed to write report")?;

    let destination = cli
        .output
        .as_ref()
        .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    let write_substep = format!("JSON → {}", destination);
    progress.complete_step("Writing report", &[write_substep.as_str()]);

    info!(
        "{} of {} runs succeeded",
        report.successful_count, report.total_requested
    );

    if plan.runs == 1 {
        if let Some(failure) = batch.failures.first() {
            progress.finish("Simulation failed");
            return Err(anyhow::Error::new(failure.clone()).context("Simulation failed"));
        }
    }

    if report.is_failure() {
        progress.finish("All simulations failed");
        return Ok(Outcome::AllFailed);
    }

    progress.finish("Simulation complete");
    Ok(Outcome::Success)
}

fn resolve_input_format(cli: &Cli) -> Result<Format> {
    if let Some(fmt) = cli.format {
        return Ok(fmt.into());
    }

    match &cli.input {
        Some(path) => infer_input_format(path).ok_or_else(|| {
            anyhow!(
                "Cannot infer input format from '{}'. Use --format to specify (json, toml).",
                path.display()
            )
        }),
        None => Ok(Format::Json),
    }
}

fn read_request(cli: &Cli, format: Format) -> Result<SimulationInput> {
    let reader = open_input(cli.input.as_deref())?;
    read_input(reader, format).context("Failed to read simulation request")
}

/// A single request runs inline as run 0; larger ones go to the pool.
fn execute(
    sim: &PackingSimulation,
    plan: &RunPlan,
    ctx: DisplayContext,
    progress: &mut Progress,
) -> BatchResults {
    if plan.runs == 1 {
        return sim.run_batch(&plan.options, 1);
    }

    progress.pause();
    let mut bar = BatchProgress::new(ctx.interactive, plan.runs);
    let batch = sim.run_parallel_with(&plan.options, plan.runs, |outcome| bar.record(outcome));
    bar.finish();
    batch
}

fn build_run_substeps(batch: &BatchResults) -> Vec<String> {
    let mut steps = vec![format!(
        "{} of {} succeeded",
        batch.successful_count(),
        batch.total_requested
    )];

    for failure in batch.failures.iter().take(3) {
        steps.push(match failure.index {
            Some(i) => format!("run {} failed: {}", i, failure.kind),
            None => format!("worker pool failed: {}", failure.kind),
        });
    }
    if batch.failed_count() > 3 {
        steps.push(format!("... {} more failures", batch.failed_count() - 3));
    }

    steps
}
