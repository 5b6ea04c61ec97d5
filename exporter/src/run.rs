use std::sync::Arc;

use anyhow::Context;
use flow_core::prelude::ShutdownHandle;
use flow_instruments::MetricAggregator;
use flow_summary_model::StageRecordReader;
use tokio::net::TcpListener;

use crate::config::ExporterConfig;
use crate::polling::PollingLoop;
use crate::server::serve;
use crate::shutdown::start_shutdown_listener;

/// Run the exporter until Ctrl-C.
pub fn run(config: ExporterConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);

    runtime.block_on(serve_and_poll(config, shutdown_handle))
}

/// Bind the scrape endpoint and run it alongside the polling loop until `shutdown_handle` fires.
///
/// If the server stops on its own, the polling loop is shut down as well.
pub async fn serve_and_poll(
    config: ExporterConfig,
    shutdown_handle: ShutdownHandle,
) -> anyhow::Result<()> {
    let aggregator = Arc::new(MetricAggregator::new());
    let reader = StageRecordReader::new(config.metrics_file.clone())
        .skip_invalid_records(config.skip_invalid_records);

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind scrape endpoint to {}", config.listen_addr()))?;

    let polling = PollingLoop::new(reader, aggregator.clone(), config.interval());
    let polling_task = tokio::spawn(polling.run(shutdown_handle.new_listener()));

    let served = serve(listener, aggregator, shutdown_handle.new_listener()).await;
    if served.is_err() {
        shutdown_handle.shutdown();
    }

    polling_task.await.context("Polling loop task failed")?;
    served.context("Scrape endpoint failed")?;

    log::info!("Exporter stopped");

    Ok(())
}
