//! QUIC transport for the RPC engine.
//!
//! This crate provides the networked half of the system:
//! - Length-prefixed envelope framing
//! - Development TLS bootstrap (self-signed server, skip-verify client)
//! - Server session and stream handling
//! - Client sessions with one-shot and channel call paths

pub mod client;
pub mod config;
pub mod error;
pub mod framing;
pub mod server;
pub mod tls;

pub use client::{CallChannel, Client, IntoArguments};
pub use config::{ClientOptions, ServerOptions};
pub use error::{CallError, ConnectError, ServeError, StreamError};
pub use framing::{FrameError, DEFAULT_MAX_FRAME_BYTES};
pub use server::{Listener, Server};
