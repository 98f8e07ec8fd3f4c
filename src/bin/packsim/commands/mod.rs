mod run;

use run::run_simulation;

use anyhow::Result;

use crate::cli::Cli;
use crate::display::Context;

pub use run::Outcome;

pub fn dispatch(cli: Cli, ctx: Context) -> Result<Outcome> {
    run_simulation(cli, ctx)
}
