//! CLI tool for the QUIC RPC engine.
//!
//! Provides commands for:
//! - Hosting the demo calculator service
//! - Issuing one-off calls against a running server
//! - Running an in-process round-trip demo

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
