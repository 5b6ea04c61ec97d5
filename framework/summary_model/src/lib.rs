//! Execution records written by the Flow pipeline engine and the summaries derived from them.
//!
//! The engine appends one [StageRecord] per stage execution to a JSON Lines file. The same file
//! feeds both the metrics exporter, which re-reads it on a fixed cadence, and the result bridge,
//! which reads it once per run to decide whether the run succeeded.

mod jsonl;
mod reader;
mod record;
mod summary;

pub use jsonl::{JsonlError, JsonlReader};
pub use reader::{StageRecordReader, DEFAULT_METRICS_FILE};
pub use record::{append_stage_record, InvalidStageRecord, StageRecord};
pub use summary::{ResultsFile, RunSummary, DEFAULT_RESULTS_FILE};
