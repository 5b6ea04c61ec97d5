use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::exchange::{keys, Exchange};

pub const DEFAULT_PREPARED_INPUT_PATH: &str = "/tmp/flow_input.json";
pub const DEFAULT_INPUT_FILES: [&str; 3] = ["data1.csv", "data2.csv", "data3.csv"];

/// Batching parameters handed to the pipeline alongside its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub batch_size: u64,
    pub threshold: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            threshold: 0.95,
        }
    }
}

/// The document the pipeline reads its inputs from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedInput {
    pub input_files: Vec<String>,
    pub config: BatchConfig,
    pub prepared_at: DateTime<Utc>,
}

/// Writes the [PreparedInput] for the pipeline and publishes how many input files it has.
#[derive(Debug, Clone)]
pub struct PrepareTask {
    input_files: Vec<String>,
    config: BatchConfig,
    output: PathBuf,
}

impl Default for PrepareTask {
    fn default() -> Self {
        Self {
            input_files: DEFAULT_INPUT_FILES.iter().map(|f| f.to_string()).collect(),
            config: BatchConfig::default(),
            output: PathBuf::from(DEFAULT_PREPARED_INPUT_PATH),
        }
    }
}

impl PrepareTask {
    /// Builds a [`PrepareTask`] with the specified input files.
    ///
    /// An empty list keeps the current files.
    pub fn input_files(mut self, input_files: Vec<String>) -> Self {
        if !input_files.is_empty() {
            self.input_files = input_files;
        }
        self
    }

    /// Builds a [`PrepareTask`] with the specified batch size.
    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Builds a [`PrepareTask`] with the specified threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Builds a [`PrepareTask`] writing its document to the specified path.
    pub fn output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    pub fn run<E>(&self, exchange: &mut E) -> anyhow::Result<PreparedInput>
    where
        E: Exchange,
    {
        if !(0.0..=1.0).contains(&self.config.threshold) {
            anyhow::bail!(
                "Threshold must be between 0 and 1, got {}",
                self.config.threshold
            );
        }

        let input = PreparedInput {
            input_files: self.input_files.clone(),
            config: self.config,
            prepared_at: Utc::now(),
        };

        let mut file = std::fs::File::create(&self.output).with_context(|| {
            format!("Failed to create prepared input {}", self.output.display())
        })?;
        serde_json::to_writer_pretty(&mut file, &input)?;
        writeln!(file)?;
        log::debug!("Prepared input written to {}", self.output.display());

        exchange.push(
            keys::PREPARE_TASK,
            keys::INPUT_FILES,
            json!(input.input_files.len()),
        )?;
        log::info!("Prepared {} input files for Flow", input.input_files.len());

        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::exchange::FileExchange;

    #[test]
    fn test_prepare_writes_input_and_publishes_count() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("flow_input.json");
        let mut exchange = FileExchange::new(dir.path().join("exchange.json"), "run-1");

        let prepared = PrepareTask::default()
            .output(output.clone())
            .run(&mut exchange)
            .unwrap();

        assert_eq!(prepared.input_files, DEFAULT_INPUT_FILES.to_vec());
        assert_eq!(prepared.config, BatchConfig::default());

        let written: PreparedInput =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, prepared);
        assert_eq!(
            exchange.pull(keys::PREPARE_TASK, keys::INPUT_FILES).unwrap(),
            Some(json!(3))
        );
    }

    #[test]
    fn test_prepare_with_custom_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut exchange = FileExchange::new(dir.path().join("exchange.json"), "run-1");

        let prepared = PrepareTask::default()
            .input_files(vec!["orders.csv".to_string()])
            .batch_size(50)
            .threshold(0.5)
            .output(dir.path().join("flow_input.json"))
            .run(&mut exchange)
            .unwrap();

        assert_eq!(prepared.input_files, vec!["orders.csv".to_string()]);
        assert_eq!(
            prepared.config,
            BatchConfig {
                batch_size: 50,
                threshold: 0.5
            }
        );
        assert_eq!(
            exchange.pull(keys::PREPARE_TASK, keys::INPUT_FILES).unwrap(),
            Some(json!(1))
        );
    }

    #[test]
    fn test_empty_input_list_keeps_defaults() {
        let task = PrepareTask::default().input_files(Vec::new());
        assert_eq!(task.input_files.len(), DEFAULT_INPUT_FILES.len());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut exchange = FileExchange::new(dir.path().join("exchange.json"), "run-1");

        let result = PrepareTask::default()
            .threshold(1.5)
            .output(dir.path().join("flow_input.json"))
            .run(&mut exchange);

        assert!(result.is_err());
        assert_eq!(
            exchange.pull(keys::PREPARE_TASK, keys::INPUT_FILES).unwrap(),
            None
        );
    }
}
