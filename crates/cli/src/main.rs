//! CLI entry point for the QUIC RPC toolkit.

use cli::CliConfig;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    config.run()
}
