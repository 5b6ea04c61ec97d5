use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::Context;

pub const DEFAULT_FLOW_BIN: &str = "flow";

/// Runs a Flow pipeline definition with the `flow` executable.
///
/// The exit status is only logged. Whether the run succeeded is decided from the execution records
/// by the extract step.
pub struct FlowPipeline {
    definition: PathBuf,
    flow_bin: PathBuf,
}

impl FlowPipeline {
    pub fn new<P>(definition: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            definition: definition.into(),
            flow_bin: PathBuf::from(DEFAULT_FLOW_BIN),
        }
    }

    /// Use another executable than `flow` from the user's `PATH`.
    pub fn flow_bin<P>(mut self, flow_bin: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.flow_bin = flow_bin.into();
        self
    }

    pub fn definition(&self) -> &Path {
        &self.definition
    }

    /// Resolve the executable, looking in the user's `PATH` unless it is a path itself.
    pub fn resolve_flow_bin(&self) -> anyhow::Result<PathBuf> {
        which::which(&self.flow_bin).with_context(|| {
            format!(
                "Flow binary '{}' not found. Please install Flow or pass the correct path.",
                self.flow_bin.display()
            )
        })
    }

    pub fn run(&self) -> anyhow::Result<ExitStatus> {
        let flow_bin = self.resolve_flow_bin()?;
        let mut process = std::process::Command::new(&flow_bin)
            .arg(&self.definition)
            .spawn()
            .with_context(|| format!("Failed to start {}", flow_bin.display()))?;

        log::debug!("Running Flow with PID: {pid}", pid = process.id());
        let status = process.wait()?;
        log::info!(
            "Flow pipeline {} finished with status: {status}",
            self.definition.display()
        );

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_an_error() {
        let pipeline = FlowPipeline::new("pipeline.fl").flow_bin("flow-binary-that-does-not-exist");

        let err = pipeline.run().unwrap_err();

        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_failing_pipeline_status_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let definition = dir.path().join("pipeline.sh");
        std::fs::write(&definition, "exit 3\n").unwrap();

        let status = FlowPipeline::new(&definition).flow_bin("sh").run().unwrap();

        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn test_resolves_from_path() {
        let pipeline = FlowPipeline::new("pipeline.fl").flow_bin("sh");

        assert!(pipeline.resolve_flow_bin().unwrap().is_absolute());
    }
}
