use std::io::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One execution of a pipeline stage, as written to the execution-record file.
///
/// Records are validated while they are deserialized: the stage name must not be empty and the
/// duration must be a finite, non-negative number of seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStageRecord")]
pub struct StageRecord {
    /// Stage identifier, used as the `stage` label.
    pub stage: String,
    /// Wall-clock duration of the stage, in seconds.
    pub duration: f64,
    /// Process exit code. `0` is success.
    pub exit_code: i64,
    /// Unix timestamp in seconds at which the record was written, when the engine provides it.
    ///
    /// Informational only: fractional and numeric-string values are truncated to whole seconds,
    /// anything else is dropped rather than rejecting the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl StageRecord {
    pub fn new(stage: impl Into<String>, duration: f64, exit_code: i64) -> Self {
        Self {
            stage: stage.into(),
            duration,
            exit_code,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Deserialize)]
struct RawStageRecord {
    stage: String,
    duration: f64,
    exit_code: i64,
    #[serde(default)]
    timestamp: Option<RawTimestamp>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Fractional(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl RawTimestamp {
    fn into_seconds(self) -> Option<i64> {
        match self {
            Self::Seconds(secs) => Some(secs),
            Self::Fractional(secs) if secs.is_finite() => Some(secs.trunc() as i64),
            Self::Text(text) => {
                let text = text.trim();
                text.parse::<i64>().ok().or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|secs| secs.is_finite())
                        .map(|secs| secs.trunc() as i64)
                })
            }
            Self::Fractional(_) | Self::Other(_) => None,
        }
    }
}

/// Why a syntactically valid line was rejected as a [StageRecord].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidStageRecord {
    #[error("stage name is empty")]
    EmptyStage,
    #[error("duration {0} is not a finite, non-negative number of seconds")]
    InvalidDuration(f64),
}

impl TryFrom<RawStageRecord> for StageRecord {
    type Error = InvalidStageRecord;

    fn try_from(raw: RawStageRecord) -> Result<Self, Self::Error> {
        if raw.stage.is_empty() {
            return Err(InvalidStageRecord::EmptyStage);
        }
        if !raw.duration.is_finite() || raw.duration < 0.0 {
            return Err(InvalidStageRecord::InvalidDuration(raw.duration));
        }

        Ok(Self {
            stage: raw.stage,
            duration: raw.duration,
            exit_code: raw.exit_code,
            timestamp: raw.timestamp.and_then(RawTimestamp::into_seconds),
        })
    }
}

/// Append a stage record to an execution-record file
///
/// The record is serialized to JSON and written as a single line followed by a newline, which is
/// the format the pipeline engine produces.
pub fn append_stage_record<P>(path: P, record: &StageRecord) -> std::io::Result<()>
where
    P: AsRef<Path>,
{
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    serde_json::to_writer(&mut file, record)?;
    writeln!(file)?;
    Ok(())
}
