use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Task and key names shared between the orchestration steps.
pub mod keys {
    pub const PREPARE_TASK: &str = "prepare_data";
    pub const EXTRACT_TASK: &str = "extract_flow_results";

    pub const INPUT_FILES: &str = "input_files";
    pub const FLOW_DURATION: &str = "flow_duration";
    pub const FLOW_SUCCESS: &str = "flow_success";
    pub const RECORDS_PROCESSED: &str = "records_processed";
}

/// Key/value hand-off between the tasks of one pipeline run.
///
/// Values are scoped to a run and addressed by the task that published them.
pub trait Exchange {
    fn push(&mut self, task_id: &str, key: &str, value: Value) -> Result<(), ExchangeError>;

    fn pull(&self, task_id: &str, key: &str) -> Result<Option<Value>, ExchangeError>;
}

type RunValues = BTreeMap<String, BTreeMap<String, Value>>;

/// An [Exchange] stored as a single JSON document shared by every run:
/// `{ "<run_id>": { "<task_id>": { "<key>": <value> } } }`.
///
/// Every push rewrites the document through a temporary file in the same directory, so readers
/// never see a half-written file.
#[derive(Debug, Clone)]
pub struct FileExchange {
    path: PathBuf,
    run_id: String,
}

impl FileExchange {
    pub fn new<P>(path: P, run_id: impl Into<String>) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, RunValues>, ExchangeError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|source| ExchangeError::Malformed {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ExchangeError::Io(e)),
        }
    }

    fn store(&self, document: &BTreeMap<String, RunValues>) -> Result<(), ExchangeError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, document).map_err(std::io::Error::from)?;
        writeln!(file)?;
        file.persist(&self.path).map_err(|e| ExchangeError::Io(e.error))?;
        Ok(())
    }
}

impl Exchange for FileExchange {
    fn push(&mut self, task_id: &str, key: &str, value: Value) -> Result<(), ExchangeError> {
        let mut document = self.load()?;
        log::trace!("Pushing {task_id}.{key} = {value} for run {}", self.run_id);
        document
            .entry(self.run_id.clone())
            .or_default()
            .entry(task_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.store(&document)
    }

    fn pull(&self, task_id: &str, key: &str) -> Result<Option<Value>, ExchangeError> {
        let document = self.load()?;
        Ok(document
            .get(&self.run_id)
            .and_then(|run| run.get(task_id))
            .and_then(|task| task.get(key))
            .cloned())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Exchange file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Expected `{task_id}.{key}` to be published for this run")]
    MissingKey { task_id: String, key: String },
    #[error("Value of `{task_id}.{key}` has the wrong type: {value}")]
    UnexpectedValue {
        task_id: String,
        key: String,
        value: Value,
    },
}
