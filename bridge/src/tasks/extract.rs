use flow_summary_model::RunSummary;
use serde_json::json;

use crate::exchange::{keys, Exchange, ExchangeError};
use crate::result_bridge::{ensure_succeeded, ExtractError, PipelineFailedError, ResultBridge};

/// Publishes the [RunSummary] of the run, then fails if any stage failed.
///
/// The keys are published before the failure is raised so later steps can still report on a
/// failed run.
pub struct ExtractTask {
    bridge: ResultBridge,
}

impl ExtractTask {
    pub fn new(bridge: ResultBridge) -> Self {
        Self { bridge }
    }

    pub fn run<E>(&self, exchange: &mut E) -> Result<RunSummary, ExtractTaskError>
    where
        E: Exchange,
    {
        let summary = self.bridge.extract()?;

        exchange.push(
            keys::EXTRACT_TASK,
            keys::FLOW_DURATION,
            json!(summary.total_duration),
        )?;
        exchange.push(
            keys::EXTRACT_TASK,
            keys::FLOW_SUCCESS,
            json!(summary.all_stages_succeeded),
        )?;
        exchange.push(
            keys::EXTRACT_TASK,
            keys::RECORDS_PROCESSED,
            json!(summary.records_processed),
        )?;

        log::info!("Flow completed in {:.2}s", summary.total_duration);
        log::info!("Records processed: {}", summary.records_processed);

        ensure_succeeded(&summary)?;

        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractTaskError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    PipelineFailed(#[from] PipelineFailedError),
}
