//! Wire envelopes and the byte codec.
//!
//! Exactly two message shapes cross a stream: a request (qualified method
//! plus argument sequence) and a response (a tagged result-or-error union).
//! Envelopes encode with bincode; the transport layer adds length framing.

use serde::{Deserialize, Serialize};

use crate::fault::Fault;
use crate::value::Value;

/// Errors that can occur while encoding or decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Envelope failed to serialize
    #[error("encode failed: {0}")]
    Encode(#[source] bincode::Error),
    /// Payload bytes did not decode as the expected envelope
    #[error("malformed envelope: {0}")]
    Malformed(#[source] bincode::Error),
}

/// Request envelope: one remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Qualified method, `Service.Method`.
    pub method: String,
    /// Positional arguments in call order.
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Response envelope: the outcome of one request.
///
/// A true tagged union. The discriminant travels on the wire, so callers
/// never inspect the payload shape to tell success from failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Call completed; carries the folded result value.
    Ok(Value),
    /// Call failed; carries the fault message exactly as produced.
    Err(String),
}

impl Response {
    /// Convert into a std `Result`, consuming the envelope.
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            Response::Ok(value) => Ok(value),
            Response::Err(message) => Err(message),
        }
    }
}

impl From<Result<Value, Fault>> for Response {
    fn from(outcome: Result<Value, Fault>) -> Self {
        match outcome {
            Ok(value) => Response::Ok(value),
            Err(fault) => Response::Err(fault.to_string()),
        }
    }
}

/// Encode an envelope to bytes.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, WireError> {
    bincode::serialize(message).map_err(WireError::Encode)
}

/// Decode an envelope from bytes.
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    bincode::deserialize(bytes).map_err(WireError::Malformed)
}
