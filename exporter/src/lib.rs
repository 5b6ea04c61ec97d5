mod cli;
mod config;
mod init;
mod polling;
mod run;
mod server;
mod shutdown;

pub mod prelude {
    pub use crate::cli::ExporterCli;
    pub use crate::config::{ConfigError, ExporterConfig, DEFAULT_INTERVAL_SECS, DEFAULT_PORT};
    pub use crate::init::init;
    pub use crate::polling::{CycleError, CycleReport, PollingLoop, RecordSource};
    pub use crate::run::{run, serve_and_poll};
    pub use crate::server::{router, serve};
}
