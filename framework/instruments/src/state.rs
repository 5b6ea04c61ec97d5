use std::collections::BTreeMap;

use flow_summary_model::StageRecord;

use crate::histogram::DurationHistogram;

/// Cumulative metric state built from stage records.
///
/// Histograms and counters accumulate across updates. The pipeline duration gauge holds the sum
/// of durations of the most recent batch only. Stages are kept in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    stage_duration_histogram: BTreeMap<String, DurationHistogram>,
    stage_success_count: BTreeMap<String, u64>,
    stage_failure_count: BTreeMap<String, u64>,
    pipeline_total_duration: f64,
}

impl AggregateState {
    pub(crate) fn apply(&mut self, records: &[StageRecord]) {
        let mut total_duration = 0.0;

        for record in records {
            self.stage_duration_histogram
                .entry(record.stage.clone())
                .or_default()
                .observe(record.duration);

            let counts = if record.succeeded() {
                &mut self.stage_success_count
            } else {
                &mut self.stage_failure_count
            };
            *counts.entry(record.stage.clone()).or_default() += 1;

            total_duration += record.duration;
        }

        self.pipeline_total_duration = total_duration;
    }

    /// Names of every stage observed so far.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stage_duration_histogram.keys().map(String::as_str)
    }

    pub fn histogram(&self, stage: &str) -> Option<&DurationHistogram> {
        self.stage_duration_histogram.get(stage)
    }

    pub fn success_count(&self, stage: &str) -> u64 {
        self.stage_success_count.get(stage).copied().unwrap_or_default()
    }

    pub fn failure_count(&self, stage: &str) -> u64 {
        self.stage_failure_count.get(stage).copied().unwrap_or_default()
    }

    pub fn pipeline_total_duration(&self) -> f64 {
        self.pipeline_total_duration
    }

    pub(crate) fn histograms(&self) -> impl Iterator<Item = (&str, &DurationHistogram)> {
        self.stage_duration_histogram
            .iter()
            .map(|(stage, histogram)| (stage.as_str(), histogram))
    }

    /// Success counts, only for stages with at least one success.
    pub(crate) fn success_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.stage_success_count
            .iter()
            .map(|(stage, count)| (stage.as_str(), *count))
    }

    /// Failure counts, only for stages with at least one failure.
    pub(crate) fn failure_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.stage_failure_count
            .iter()
            .map(|(stage, count)| (stage.as_str(), *count))
    }
}
