use std::sync::Arc;
use std::time::Duration;

use flow_core::prelude::DelegatedShutdownListener;
use flow_instruments::MetricAggregator;
use flow_summary_model::{JsonlError, StageRecord, StageRecordReader};

/// Where a polling cycle gets its stage records from.
pub trait RecordSource: Send + Sync + 'static {
    fn read_records(&self) -> Result<Vec<StageRecord>, JsonlError>;
}

impl RecordSource for StageRecordReader {
    fn read_records(&self) -> Result<Vec<StageRecord>, JsonlError> {
        self.read()
    }
}

/// Outcome of a successful polling cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Number of stage records applied.
    pub records: usize,
    /// Sum of the applied durations, which is what the pipeline duration gauge now reports.
    pub total_duration: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Failed to read stage records: {0}")]
    Read(#[from] JsonlError),
    #[error("Polling cycle panicked: {0}")]
    Panicked(String),
}

/// Re-reads the execution records on a fixed interval and feeds them to a [MetricAggregator].
///
/// A failed cycle is logged and leaves the aggregate state as it was. The loop keeps going until
/// the shutdown listener fires.
pub struct PollingLoop<S> {
    source: Arc<S>,
    aggregator: Arc<MetricAggregator>,
    interval: Duration,
}

impl<S> PollingLoop<S>
where
    S: RecordSource,
{
    pub fn new(source: S, aggregator: Arc<MetricAggregator>, interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            aggregator,
            interval,
        }
    }

    /// Run a single read-and-aggregate cycle.
    ///
    /// The cycle runs on the blocking pool, so a panic while reading or aggregating is reported as
    /// [CycleError::Panicked] rather than unwinding into the caller.
    pub async fn poll_once(&self) -> Result<CycleReport, CycleError> {
        let source = self.source.clone();
        let aggregator = self.aggregator.clone();

        tokio::task::spawn_blocking(move || -> Result<CycleReport, CycleError> {
            let records = source.read_records()?;
            aggregator.update(&records);

            Ok(CycleReport {
                records: records.len(),
                total_duration: records.iter().map(|r| r.duration).sum(),
            })
        })
        .await
        .map_err(|e| CycleError::Panicked(e.to_string()))?
    }

    /// Poll immediately, then once per interval, until shutdown is signalled.
    pub async fn run(self, mut shutdown_listener: DelegatedShutdownListener) {
        log::info!("Polling stage records every {:?}", self.interval);

        loop {
            match self.poll_once().await {
                Ok(report) => {
                    log::info!(
                        "Exported metrics for {} stages, total duration {:.2}s",
                        report.records,
                        report.total_duration
                    );
                }
                Err(e) => {
                    log::error!("Error parsing metrics: {e}");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_listener.wait_for_shutdown() => {
                    log::debug!("Polling loop shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use flow_core::prelude::ShutdownHandle;

    use super::*;

    /// Yields the scripted results in order, then repeats the last one.
    struct ScriptedSource {
        calls: AtomicUsize,
        script: Vec<Option<Vec<StageRecord>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Option<Vec<StageRecord>>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script,
            }
        }
    }

    impl RecordSource for ScriptedSource {
        fn read_records(&self) -> Result<Vec<StageRecord>, JsonlError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let step = &self.script[call.min(self.script.len() - 1)];
            match step {
                Some(records) => Ok(records.clone()),
                None => Err(JsonlError::Io(std::io::Error::other("unreadable"))),
            }
        }
    }

    struct PanickingSource;

    impl RecordSource for PanickingSource {
        fn read_records(&self) -> Result<Vec<StageRecord>, JsonlError> {
            panic!("source exploded");
        }
    }

    #[tokio::test]
    async fn test_poll_once_applies_records() {
        let aggregator = Arc::new(MetricAggregator::new());
        let polling = PollingLoop::new(
            ScriptedSource::new(vec![Some(vec![
                StageRecord::new("a", 1.0, 0),
                StageRecord::new("b", 2.0, 1),
            ])]),
            aggregator.clone(),
            Duration::from_secs(10),
        );

        let report = polling.poll_once().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                records: 2,
                total_duration: 3.0
            }
        );
        assert_eq!(aggregator.snapshot().failure_count("b"), 1);
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_state() {
        let aggregator = Arc::new(MetricAggregator::new());
        let polling = PollingLoop::new(
            ScriptedSource::new(vec![
                Some(vec![StageRecord::new("a", 1.5, 0)]),
                None,
                Some(vec![StageRecord::new("a", 1.5, 0)]),
            ]),
            aggregator.clone(),
            Duration::from_secs(10),
        );

        polling.poll_once().await.unwrap();
        let before = aggregator.snapshot();

        assert!(matches!(polling.poll_once().await, Err(CycleError::Read(_))));
        assert_eq!(aggregator.snapshot(), before);

        polling.poll_once().await.unwrap();
        assert_eq!(aggregator.snapshot().success_count("a"), 2);
    }

    #[tokio::test]
    async fn test_panicking_cycle_is_isolated() {
        let aggregator = Arc::new(MetricAggregator::new());
        aggregator.update(&[StageRecord::new("a", 1.0, 0)]);
        let polling = PollingLoop::new(PanickingSource, aggregator.clone(), Duration::from_secs(10));

        let result = polling.poll_once().await;

        assert!(matches!(result, Err(CycleError::Panicked(_))));
        assert_eq!(aggregator.snapshot().success_count("a"), 1);
    }

    #[tokio::test]
    async fn test_run_keeps_polling_through_failures_until_shutdown() {
        let aggregator = Arc::new(MetricAggregator::new());
        let source = ScriptedSource::new(vec![None, Some(vec![StageRecord::new("a", 1.0, 0)])]);
        let polling = PollingLoop::new(source, aggregator.clone(), Duration::from_millis(10));

        let shutdown_handle = ShutdownHandle::new();
        let task = tokio::spawn(polling.run(shutdown_handle.new_listener()));

        tokio::time::timeout(Duration::from_secs(5), async {
            while aggregator.snapshot().success_count("a") < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("polling loop did not recover after a failed cycle");

        shutdown_handle.shutdown();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("polling loop did not stop on shutdown")
            .unwrap();
    }
}
