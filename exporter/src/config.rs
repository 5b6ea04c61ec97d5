use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flow_summary_model::DEFAULT_METRICS_FILE;
use serde::Deserialize;

use crate::cli::ExporterCli;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Settings for one exporter process.
///
/// Can be loaded from a TOML file where every key is optional:
///
/// ```toml
/// metrics_file = "/var/lib/flow/__flow_metrics__.json"
/// bind_address = "127.0.0.1"
/// port = 9100
/// interval_secs = 30
/// skip_invalid_records = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    pub metrics_file: PathBuf,
    pub bind_address: IpAddr,
    pub port: u16,
    pub interval_secs: u64,
    pub skip_invalid_records: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            metrics_file: PathBuf::from(DEFAULT_METRICS_FILE),
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            interval_secs: DEFAULT_INTERVAL_SECS,
            skip_invalid_records: false,
        }
    }
}

impl ExporterConfig {
    /// Builds an [`ExporterConfig`] with the specified execution-record file.
    pub fn metrics_file(mut self, path: PathBuf) -> Self {
        self.metrics_file = path;
        self
    }

    /// Builds an [`ExporterConfig`] with the specified bind address.
    pub fn bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    /// Builds an [`ExporterConfig`] with the specified port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builds an [`ExporterConfig`] with the specified polling interval in seconds.
    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Builds an [`ExporterConfig`] that skips malformed record lines.
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.skip_invalid_records = skip;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Merge the config file named by the CLI (if any) with the flags given on the command line.
    pub fn from_cli(cli: &ExporterCli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(metrics_file) = &cli.metrics_file {
            config = config.metrics_file(metrics_file.clone());
        }
        if let Some(bind_address) = cli.bind_address {
            config = config.bind_address(bind_address);
        }
        if let Some(port) = cli.port {
            config = config.port(port);
        }
        if let Some(interval) = cli.interval {
            config = config.interval_secs(interval);
        }
        if cli.skip_invalid_records {
            config = config.skip_invalid_records(true);
        }

        config.validate()
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("The polling interval must be at least one second")]
    ZeroInterval,
}
