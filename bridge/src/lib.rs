//! Scheduler-facing steps for Flow pipeline runs.
//!
//! The [ResultBridge] turns the execution records a run leaves behind into a [RunSummary], and
//! the [tasks] publish it through an [exchange] for the following steps.
//!
//! [RunSummary]: flow_summary_model::RunSummary

mod cli;
pub mod exchange;
mod result_bridge;
mod run;
pub mod tasks;

pub use self::cli::{BridgeCli, BridgeCommand};
pub use self::result_bridge::{
    ensure_succeeded, ExtractError, PipelineFailedError, ResultBridge, ResultsReadError,
};
pub use self::run::run;
