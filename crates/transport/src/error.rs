//! Transport-side error taxonomy.
//!
//! These errors stay on the failing side; only call-level fault messages
//! cross the wire, as the error arm of a response envelope.

use corelib::WireError;

use crate::framing::FrameError;
use crate::tls::TlsError;

/// Errors establishing an outbound session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Local endpoint setup failed
    #[error("endpoint setup failed: {0}")]
    Endpoint(#[from] std::io::Error),
    /// Dial target was rejected before the handshake started
    #[error("dial failed: {0}")]
    Dial(#[from] quinn::ConnectError),
    /// QUIC handshake failed
    #[error("handshake failed: {0}")]
    Handshake(#[from] quinn::ConnectionError),
}

/// Errors on the local side of one call.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Could not open a stream on the session
    #[error("stream open failed: {0}")]
    StreamOpen(#[source] quinn::ConnectionError),
    /// Request failed to encode
    #[error("request encode failed: {0}")]
    Encode(#[source] WireError),
    /// Response failed to decode
    #[error("response decode failed: {0}")]
    Decode(#[source] WireError),
    /// Frame transfer failed
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Stream ended before a response arrived
    #[error("stream closed before response")]
    NoResponse,
    /// Server reported a call-level fault; displays the message verbatim
    #[error("{0}")]
    Remote(String),
}

impl CallError {
    /// The fault message transmitted by the server, if this is one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            CallError::Remote(message) => Some(message),
            _ => None,
        }
    }
}

/// Errors binding or running a server endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// TLS bootstrap failed
    #[error(transparent)]
    Tls(#[from] TlsError),
    /// Endpoint could not bind
    #[error("bind failed: {0}")]
    Bind(#[from] std::io::Error),
}

/// Errors terminating one server-side stream loop.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Frame transfer failed
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Request payload did not decode
    #[error("request decode failed: {0}")]
    Decode(#[source] WireError),
    /// Response failed to encode
    #[error("response encode failed: {0}")]
    Encode(#[source] WireError),
}
