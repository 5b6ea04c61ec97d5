use clap::Parser as _;
use flow_bridge::BridgeCli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    env_logger::try_init()?;

    let cli = BridgeCli::parse();
    log::info!("{CRATE_NAME} {CRATE_VERSION}");

    flow_bridge::run(cli)
}
