//! Core RPC engine: value model, wire envelopes, registry, and dispatch.
//!
//! This crate is transport-agnostic. It provides:
//! - Dynamic `Value` model and typed conversions
//! - Request/response envelopes and the byte codec
//! - Call-level fault taxonomy
//! - Service capability traits and the typed dispatch table
//! - Qualified-name dispatcher

pub mod dispatch;
pub mod fault;
pub mod registry;
pub mod service;
pub mod value;
pub mod wire;

pub use dispatch::{parse_qualified, Dispatcher};
pub use fault::Fault;
pub use registry::ServiceRegistry;
pub use service::{
    AsyncHandler, FromArguments, Handler, IntoReply, Method, Service, ServiceTable,
};
pub use value::{FromValue, IntoValue, Value, ValueError};
pub use wire::{Request, Response, WireError};
