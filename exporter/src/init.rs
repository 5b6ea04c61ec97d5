use crate::cli::ExporterCli;
use clap::Parser;

/// Initialise the CLI and logging for the exporter.
pub fn init() -> ExporterCli {
    env_logger::init();

    ExporterCli::parse()
}
