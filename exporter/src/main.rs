use anyhow::Context;
use flow_exporter::prelude::{init, run, ExporterConfig};

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    let cli = init();
    log::info!("{CRATE_NAME} {CRATE_VERSION}");

    let config = ExporterConfig::from_cli(&cli).context("Failed to load exporter configuration")?;
    log::info!("Using execution-record file: {}", config.metrics_file.display());

    run(config)
}
