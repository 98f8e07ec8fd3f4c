use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueEnum};

#[derive(Parser)]
#[command(
    name = "packsim",
    about = "Simulate the packing of hexagonal prisms in a box",
    version,
    author,
    before_help = crate::display::banner_for_help()
)]
pub struct Cli {
    /// Request document, JSON or TOML (stdin if omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Report file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Input format (inferred from extension if not specified, JSON for stdin)
    #[arg(long = "format", value_name = "FORMAT")]
    pub format: Option<InputFormat>,

    #[command(flatten)]
    pub run: RunOptions,

    #[command(flatten)]
    pub tools: ToolOptions,

    /// Suppress banner, progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Overrides for values in the request document.
#[derive(Args)]
#[command(next_help_heading = "Run Options")]
pub struct RunOptions {
    /// Number of independent runs
    #[arg(short = 'n', long = "runs", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub runs: Option<u32>,

    /// Worker threads for batches (default: min(N, logical CPUs))
    #[arg(short = 'j', long, value_name = "THREADS", value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: Option<u32>,

    /// Boundary cutoff distance passed to the extractor
    #[arg(long, value_name = "DIST")]
    pub cutoff: Option<f64>,

    /// Axis along which the cutoff applies
    #[arg(long = "cutoff-direction", value_name = "AXIS")]
    pub cutoff_direction: Option<CutoffAxis>,
}

#[derive(Args)]
#[command(next_help_heading = "External Tools")]
pub struct ToolOptions {
    /// Packing generator executable
    #[arg(long, value_name = "PROG")]
    pub packgen: Option<String>,

    /// Scripting engine used for mesh extraction
    #[arg(long, value_name = "PROG")]
    pub matlab: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InputFormat {
    Json,
    Toml,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CutoffAxis {
    X,
    Y,
    Z,
}

impl From<InputFormat> for packsim::io::Format {
    fn from(f: InputFormat) -> Self {
        match f {
            InputFormat::Json => packsim::io::Format::Json,
            InputFormat::Toml => packsim::io::Format::Toml,
        }
    }
}

impl From<CutoffAxis> for packsim::Axis {
    fn from(a: CutoffAxis) -> Self {
        match a {
            CutoffAxis::X => packsim::Axis::X,
            CutoffAxis::Y => packsim::Axis::Y,
            CutoffAxis::Z => packsim::Axis::Z,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
