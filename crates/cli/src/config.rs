//! Command-line configuration and process setup.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

/// Minimal RPC over QUIC.
#[derive(Debug, Parser)]
#[command(name = "jolt", version, about = "Minimal RPC over QUIC")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Initialize logging, start a runtime, and execute the command.
    pub fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.command.run())
    }
}
