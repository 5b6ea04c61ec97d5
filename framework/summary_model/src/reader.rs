use std::path::{Path, PathBuf};

use crate::jsonl::{JsonlError, JsonlReader};
use crate::record::StageRecord;

/// Default name of the execution-record file written by the pipeline engine.
pub const DEFAULT_METRICS_FILE: &str = "__flow_metrics__.json";

/// Reads the execution-record file of a pipeline run into [StageRecord]s.
///
/// The file is re-read in full on every call. A missing file means the pipeline has not produced
/// any records yet and is reported as an empty sequence.
///
/// By default a single malformed line fails the whole read. Use
/// [StageRecordReader::skip_invalid_records] to skip and log such lines instead.
#[derive(Debug, Clone)]
pub struct StageRecordReader {
    path: PathBuf,
    reader: JsonlReader,
}

impl StageRecordReader {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            reader: JsonlReader::default(),
        }
    }

    /// Builds a [`StageRecordReader`] that skips malformed lines when `skip` is true.
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.reader.allow_invalid_entries = skip;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<StageRecord>, JsonlError> {
        match self.reader.parse_from_file(&self.path) {
            Err(JsonlError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "Execution-record file {} does not exist yet",
                    self.path.display()
                );
                Ok(Vec::new())
            }
            result => result,
        }
    }
}
