use flow_summary_model::StageRecord;
use parking_lot::RwLock;

use crate::state::AggregateState;

/// Sole owner and mutator of the process-wide [AggregateState].
///
/// Each [MetricAggregator::update] is published as one unit: readers calling
/// [MetricAggregator::snapshot] see the state either entirely before or entirely after a batch.
#[derive(Debug, Default)]
pub struct MetricAggregator {
    state: RwLock<AggregateState>,
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every record in `records` to the cumulative state and set the pipeline duration
    /// gauge to the sum of this batch.
    pub fn update(&self, records: &[StageRecord]) {
        let mut state = self.state.write();
        // Built on a copy so that a panic part way through leaves the published state untouched.
        let mut next = state.clone();
        next.apply(records);
        *state = next;

        log::trace!("Applied {} stage records", records.len());
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> AggregateState {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_snapshot_of_new_aggregator_is_empty() {
        let snapshot = MetricAggregator::new().snapshot();

        assert_eq!(snapshot.stage_names().count(), 0);
        assert_eq!(snapshot.pipeline_total_duration(), 0.0);
    }

    #[test]
    fn test_update_then_snapshot() {
        let aggregator = MetricAggregator::new();
        aggregator.update(&[
            StageRecord::new("a", 2.0, 0),
            StageRecord::new("b", 3.0, 1),
            StageRecord::new("a", 1.0, 0),
        ]);

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.success_count("a"), 2);
        assert_eq!(snapshot.failure_count("b"), 1);
        assert_eq!(snapshot.pipeline_total_duration(), 6.0);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_updates() {
        let aggregator = MetricAggregator::new();
        aggregator.update(&[StageRecord::new("a", 1.0, 0)]);
        let before = aggregator.snapshot();

        aggregator.update(&[StageRecord::new("a", 1.0, 0)]);

        assert_eq!(before.success_count("a"), 1);
        assert_eq!(aggregator.snapshot().success_count("a"), 2);
    }

    #[test]
    fn test_concurrent_snapshots_never_see_partial_batches() {
        let aggregator = Arc::new(MetricAggregator::new());
        let done = Arc::new(AtomicBool::new(false));
        let batch = (0..50)
            .map(|i| StageRecord::new(format!("stage-{}", i % 5), 0.1, i % 3))
            .collect::<Vec<_>>();

        let readers = (0..4)
            .map(|_| {
                let aggregator = aggregator.clone();
                let done = done.clone();
                std::thread::spawn(move || {
                    let mut checked = 0;
                    while !done.load(Ordering::Acquire) || checked == 0 {
                        let snapshot = aggregator.snapshot();
                        let mut observations = 0;
                        for stage in snapshot.stage_names() {
                            let count = snapshot.histogram(stage).map(|h| h.count()).unwrap_or(0);
                            assert_eq!(
                                count,
                                snapshot.success_count(stage) + snapshot.failure_count(stage),
                                "partial update observed for {stage}"
                            );
                            observations += count;
                        }
                        assert_eq!(observations % batch_len(), 0);
                        checked += 1;
                    }
                })
            })
            .collect::<Vec<_>>();

        for _ in 0..200 {
            aggregator.update(&batch);
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            reader.join().unwrap();
        }

        let snapshot = aggregator.snapshot();
        let total = snapshot
            .stage_names()
            .map(|stage| snapshot.success_count(stage) + snapshot.failure_count(stage))
            .sum::<u64>();
        assert_eq!(total, 200 * batch_len());
    }

    fn batch_len() -> u64 {
        50
    }
}
