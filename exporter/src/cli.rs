use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

/// Flags left unset fall back to the config file, then to the built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(about, long_about = None)]
pub struct ExporterCli {
    /// Path to a TOML config file. Flags given on the command line override its values.
    #[clap(long, env = "FLOW_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the execution-record file written by the pipeline engine
    #[clap(long, env = "FLOW_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,

    /// Address to bind the scrape endpoint to
    #[clap(long)]
    pub bind_address: Option<IpAddr>,

    /// Port to serve `/metrics` on
    #[clap(short, long, env = "FLOW_EXPORTER_PORT")]
    pub port: Option<u16>,

    /// Seconds to wait between two reads of the execution-record file
    #[clap(long)]
    pub interval: Option<u64>,

    /// Skip malformed lines in the execution-record file instead of failing the whole cycle.
    ///
    /// By default a single bad line means the cycle is skipped and the metrics stay as they were
    /// until the file can be read again.
    #[clap(long, default_value = "false")]
    pub skip_invalid_records: bool,
}
