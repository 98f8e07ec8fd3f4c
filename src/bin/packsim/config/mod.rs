mod simulation;

pub use simulation::{RunPlan, build_run_plan};
