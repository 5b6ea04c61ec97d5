use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flow_summary_model::{DEFAULT_METRICS_FILE, DEFAULT_RESULTS_FILE};

use crate::tasks::{DEFAULT_FLOW_BIN, DEFAULT_PREPARED_INPUT_PATH};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct BridgeCli {
    /// File the steps of a run share their values through.
    #[arg(
        long,
        env = "FLOW_EXCHANGE_FILE",
        default_value = "flow_exchange.json",
        global = true
    )]
    pub exchange_file: PathBuf,

    /// Identifier of the scheduled run. `prepare` generates one when it is not set.
    #[arg(long, env = "FLOW_RUN_ID", global = true)]
    pub run_id: Option<String>,

    #[command(subcommand)]
    pub command: BridgeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    /// Write the pipeline input document and publish the number of input files.
    Prepare {
        /// Input file for the pipeline, can be repeated. Defaults to the sample data set.
        #[arg(long = "input-file")]
        input_files: Vec<String>,

        #[arg(long, default_value_t = 1000)]
        batch_size: u64,

        #[arg(long, default_value_t = 0.95)]
        threshold: f64,

        /// Where to write the prepared input.
        #[arg(long, default_value = DEFAULT_PREPARED_INPUT_PATH)]
        output: PathBuf,
    },
    /// Run a pipeline definition with the Flow executable.
    Run {
        /// Path to the pipeline definition.
        #[arg(long)]
        pipeline: PathBuf,

        /// Flow executable, looked up in `PATH` unless it is a path.
        #[arg(long, default_value = DEFAULT_FLOW_BIN)]
        flow_bin: PathBuf,
    },
    /// Summarise the run from its execution records and publish the result.
    Extract {
        #[arg(long, default_value = DEFAULT_METRICS_FILE)]
        metrics_file: PathBuf,

        #[arg(long, default_value = DEFAULT_RESULTS_FILE)]
        results_file: PathBuf,
    },
    /// Print the published summary of the run.
    Notify,
}
