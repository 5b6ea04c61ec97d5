use std::path::{Path, PathBuf};

use flow_summary_model::{JsonlError, ResultsFile, RunSummary, StageRecordReader};

/// Computes the [RunSummary] of a finished pipeline run.
///
/// The execution-record file is authoritative: if it cannot be parsed the extraction fails. The
/// results file is best effort and only contributes `records_processed`.
#[derive(Debug, Clone)]
pub struct ResultBridge {
    metrics_file: PathBuf,
    results_file: PathBuf,
}

impl ResultBridge {
    pub fn new<M, R>(metrics_file: M, results_file: R) -> Self
    where
        M: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        Self {
            metrics_file: metrics_file.into(),
            results_file: results_file.into(),
        }
    }

    pub fn extract(&self) -> Result<RunSummary, ExtractError> {
        let records = StageRecordReader::new(&self.metrics_file)
            .read()
            .map_err(|source| ExtractError::Records {
                path: self.metrics_file.clone(),
                source,
            })?;
        log::debug!(
            "Read {} stage records from {}",
            records.len(),
            self.metrics_file.display()
        );

        // The results file is optional, any failure to read it just means the count is unknown.
        let records_processed = match self.read_results() {
            Ok(results) => results.records_processed,
            Err(e) => {
                log::debug!("Defaulting records_processed to 0: {e}");
                0
            }
        };

        Ok(RunSummary::from_records(&records, records_processed))
    }

    /// Read the business results file, classifying why it could not be used.
    pub fn read_results(&self) -> Result<ResultsFile, ResultsReadError> {
        let content = match std::fs::read_to_string(&self.results_file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResultsReadError::Missing(self.results_file.clone()))
            }
            Err(source) => {
                return Err(ResultsReadError::Io {
                    path: self.results_file.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ResultsReadError::Malformed {
            path: self.results_file.clone(),
            source,
        })
    }

    pub fn metrics_file(&self) -> &Path {
        &self.metrics_file
    }

    pub fn results_file(&self) -> &Path {
        &self.results_file
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read execution records from {}: {source}", path.display())]
    Records {
        path: PathBuf,
        #[source]
        source: JsonlError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ResultsReadError {
    #[error("Results file {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("Failed to read results file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Results file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raised by the extraction step when at least one stage of the run failed.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct PipelineFailedError {
    msg: String,
}

impl Default for PipelineFailedError {
    fn default() -> Self {
        Self {
            msg: "Flow pipeline failed".to_string(),
        }
    }
}

/// Turn an unsuccessful [RunSummary] into a [PipelineFailedError].
pub fn ensure_succeeded(summary: &RunSummary) -> Result<(), PipelineFailedError> {
    if summary.all_stages_succeeded {
        Ok(())
    } else {
        Err(PipelineFailedError::default())
    }
}

#[cfg(test)]
mod tests {
    use flow_summary_model::{append_stage_record, StageRecord};
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn metrics_file(&self) -> PathBuf {
            self.dir.path().join("__flow_metrics__.json")
        }

        fn results_file(&self) -> PathBuf {
            self.dir.path().join("__flow_xcom__.json")
        }

        fn bridge(&self) -> ResultBridge {
            ResultBridge::new(self.metrics_file(), self.results_file())
        }
    }

    #[test]
    fn test_failed_stage_without_results_file() {
        let fixture = Fixture::new();
        append_stage_record(fixture.metrics_file(), &StageRecord::new("a", 2.0, 0)).unwrap();
        append_stage_record(fixture.metrics_file(), &StageRecord::new("b", 3.0, 1)).unwrap();

        let summary = fixture.bridge().extract().unwrap();

        assert_eq!(
            summary,
            RunSummary {
                records_processed: 0,
                total_duration: 5.0,
                all_stages_succeeded: false,
            }
        );
        assert!(ensure_succeeded(&summary).is_err());
    }

    #[test]
    fn test_empty_record_set_is_successful() {
        let fixture = Fixture::new();
        std::fs::write(fixture.metrics_file(), "").unwrap();

        let summary = fixture.bridge().extract().unwrap();

        assert!(summary.all_stages_succeeded);
        assert_eq!(summary.total_duration, 0.0);
        assert!(ensure_succeeded(&summary).is_ok());
    }

    #[test]
    fn test_missing_metrics_file_is_an_empty_run() {
        let fixture = Fixture::new();

        let summary = fixture.bridge().extract().unwrap();

        assert!(summary.all_stages_succeeded);
        assert_eq!(summary.records_processed, 0);
    }

    #[test]
    fn test_records_processed_from_results_file() {
        let fixture = Fixture::new();
        append_stage_record(fixture.metrics_file(), &StageRecord::new("a", 4.0, 0)).unwrap();
        std::fs::write(fixture.results_file(), r#"{"records_processed":"2500"}"#).unwrap();

        let summary = fixture.bridge().extract().unwrap();

        assert_eq!(summary.records_processed, 2500);
        assert_eq!(summary.throughput(), Some(625.0));
    }

    #[test]
    fn test_malformed_results_file_is_swallowed() {
        let fixture = Fixture::new();
        append_stage_record(fixture.metrics_file(), &StageRecord::new("a", 1.0, 0)).unwrap();
        std::fs::write(fixture.results_file(), "{not json").unwrap();

        assert!(matches!(
            fixture.bridge().read_results(),
            Err(ResultsReadError::Malformed { .. })
        ));
        assert_eq!(fixture.bridge().extract().unwrap().records_processed, 0);
    }

    #[test]
    fn test_missing_results_file_is_classified() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.bridge().read_results(),
            Err(ResultsReadError::Missing(_))
        ));
    }

    #[test]
    fn test_malformed_metrics_file_propagates() {
        let fixture = Fixture::new();
        std::fs::write(fixture.metrics_file(), "{\"stage\":\"a\"}\n").unwrap();

        assert!(matches!(
            fixture.bridge().extract(),
            Err(ExtractError::Records { .. })
        ));
    }

    #[test]
    fn test_pipeline_failed_error_message() {
        assert_eq!(
            PipelineFailedError::default().to_string(),
            "Flow pipeline failed"
        );
    }
}
