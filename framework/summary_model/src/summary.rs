use serde::{Deserialize, Serialize};

use crate::record::StageRecord;

/// Default name of the business results file written by the pipeline engine.
pub const DEFAULT_RESULTS_FILE: &str = "__flow_xcom__.json";

/// Business-level result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of records the pipeline reported as processed, `0` when unknown.
    pub records_processed: u64,
    /// Sum of all stage durations, in seconds.
    pub total_duration: f64,
    /// True when every stage exited with `0`. Vacuously true when there are no stages.
    pub all_stages_succeeded: bool,
}

impl RunSummary {
    pub fn from_records(records: &[StageRecord], records_processed: u64) -> Self {
        Self {
            records_processed,
            total_duration: records.iter().map(|r| r.duration).sum(),
            all_stages_succeeded: records.iter().all(StageRecord::succeeded),
        }
    }

    /// Records processed per second of pipeline time.
    ///
    /// Returns `None` when no time was recorded, rather than dividing by zero.
    pub fn throughput(&self) -> Option<f64> {
        (self.total_duration > 0.0).then(|| self.records_processed as f64 / self.total_duration)
    }
}

/// The results file the pipeline exports for the orchestrator.
///
/// Only `records_processed` is read. The engine writes exported values as strings, so both
/// `{"records_processed": 42}` and `{"records_processed": "42"}` are accepted. A file without the
/// key reports `0`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultsFile {
    #[serde(default, deserialize_with = "count_from_number_or_string")]
    pub records_processed: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountValue {
    Number(u64),
    Text(String),
}

fn count_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match CountValue::deserialize(deserializer)? {
        CountValue::Number(n) => Ok(n),
        CountValue::Text(s) => s.trim().parse().map_err(|e| {
            serde::de::Error::custom(format!("records_processed `{s}` is not a count: {e}"))
        }),
    }
}
