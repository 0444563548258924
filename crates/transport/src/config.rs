//! Connection options for servers and clients.

use std::sync::Arc;

use crate::framing::DEFAULT_MAX_FRAME_BYTES;

/// Options governing a server endpoint.
///
/// Every field has a working development default: a self-signed
/// certificate, quinn's stock transport parameters, 1 MiB frames.
pub struct ServerOptions {
    /// TLS override. `None` generates a self-signed certificate at bind.
    pub tls: Option<quinn::ServerConfig>,
    /// QUIC transport parameter override (idle timeout, keep-alive,
    /// concurrent stream admission, ...).
    pub transport: Option<Arc<quinn::TransportConfig>>,
    /// Cap on a single envelope's encoded size, both directions.
    pub max_frame_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            tls: None,
            transport: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ServerOptions {
    pub fn with_tls(mut self, tls: quinn::ServerConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_transport(mut self, transport: Arc<quinn::TransportConfig>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }
}

/// Options governing an outbound session.
pub struct ClientOptions {
    /// Server name used for SNI and certificate checks.
    pub server_name: String,
    /// TLS override. `None` skips certificate verification.
    pub tls: Option<quinn::ClientConfig>,
    /// QUIC transport parameter override.
    pub transport: Option<Arc<quinn::TransportConfig>>,
    /// Cap on a single envelope's encoded size, both directions.
    pub max_frame_bytes: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            server_name: "localhost".to_string(),
            tls: None,
            transport: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ClientOptions {
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn with_tls(mut self, tls: quinn::ClientConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_transport(mut self, transport: Arc<quinn::TransportConfig>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }
}
