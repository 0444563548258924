//! QUIC server: session accept, stream loops, dispatch.
//!
//! Concurrency model: one task accepts sessions; each session gets a task
//! accepting its streams; each stream gets a task running the call loop.
//! Within a stream, exchanges are strictly sequential. Stream admission per
//! session is governed by QUIC itself.

use std::net::SocketAddr;
use std::sync::Arc;

use quinn::{Connection, Endpoint, RecvStream, SendStream};
use tracing::{debug, info, warn};

use corelib::{wire, Dispatcher, Request, Response, Service, ServiceRegistry};

use crate::config::ServerOptions;
use crate::error::{ServeError, StreamError};
use crate::framing::{read_frame, write_frame};
use crate::tls;

/// RPC server over QUIC.
///
/// Owns the registry; services may be registered before binding and while
/// serving.
pub struct Server {
    registry: Arc<ServiceRegistry>,
    options: ServerOptions,
}

impl Server {
    pub fn new() -> Self {
        Self::with_options(ServerOptions::default())
    }

    pub fn with_options(options: ServerOptions) -> Self {
        Self {
            registry: Arc::new(ServiceRegistry::new()),
            options,
        }
    }

    /// Register `service` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, service: Arc<dyn Service>) {
        let name = name.into();
        debug!(service = %name, "registered service");
        self.registry.register(name, service);
    }

    /// Shared registry handle, for registration while serving.
    pub fn registry(&self) -> Arc<ServiceRegistry> {
        self.registry.clone()
    }

    /// Bind the endpoint without starting the accept loop.
    ///
    /// Binding to port zero and reading back `local_addr` is the supported
    /// way to serve on an ephemeral port.
    pub fn bind(&self, addr: SocketAddr) -> Result<Listener, ServeError> {
        let mut config = match &self.options.tls {
            Some(tls) => tls.clone(),
            None => tls::self_signed_server_config()?,
        };
        if let Some(transport) = &self.options.transport {
            config.transport = transport.clone();
        }

        let endpoint = Endpoint::server(config, addr)?;
        let local_addr = endpoint.local_addr()?;
        Ok(Listener {
            endpoint,
            local_addr,
            dispatcher: Dispatcher::new(self.registry.clone()),
            max_frame_bytes: self.options.max_frame_bytes,
        })
    }

    /// Bind and accept sessions until the endpoint closes.
    pub async fn serve(&self, addr: SocketAddr) -> Result<(), ServeError> {
        self.bind(addr)?.run().await
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

/// Bound server endpoint, ready to accept sessions.
pub struct Listener {
    endpoint: Endpoint,
    local_addr: SocketAddr,
    dispatcher: Dispatcher,
    max_frame_bytes: usize,
}

impl Listener {
    /// Address the endpoint actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle to the endpoint, e.g. to close it from another task.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    /// Accept sessions until the endpoint closes.
    ///
    /// A failed handshake skips that session only; the loop keeps serving.
    pub async fn run(self) -> Result<(), ServeError> {
        info!(addr = %self.local_addr, "listening");
        while let Some(connecting) = self.endpoint.accept().await {
            let dispatcher = self.dispatcher.clone();
            let max_frame_bytes = self.max_frame_bytes;
            tokio::spawn(async move {
                match connecting.await {
                    Ok(connection) => {
                        handle_session(connection, dispatcher, max_frame_bytes).await;
                    }
                    Err(err) => debug!(error = %err, "handshake failed"),
                }
            });
        }
        info!(addr = %self.local_addr, "endpoint closed");
        Ok(())
    }
}

/// Accept and serve every stream the peer opens on one session.
async fn handle_session(connection: Connection, dispatcher: Dispatcher, max_frame_bytes: usize) {
    let remote = connection.remote_address();
    debug!(%remote, "session established");
    loop {
        match connection.accept_bi().await {
            Ok((send, recv)) => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_stream(send, recv, dispatcher, max_frame_bytes).await
                    {
                        warn!(%remote, error = %err, "stream loop failed");
                    }
                });
            }
            Err(err) => {
                debug!(%remote, reason = %err, "session closed");
                return;
            }
        }
    }
}

/// Run the request/response loop on one stream until it ends.
///
/// A dispatch fault is a normal outcome: it is folded into the response and
/// the loop continues with the next request. Only transport and codec
/// failures terminate the loop.
async fn handle_stream(
    mut send: SendStream,
    mut recv: RecvStream,
    dispatcher: Dispatcher,
    max_frame_bytes: usize,
) -> Result<(), StreamError> {
    loop {
        let payload = match read_frame(&mut recv, max_frame_bytes).await? {
            Some(payload) => payload,
            None => {
                // Peer finished at a frame boundary; close our side too.
                if let Err(err) = send.finish().await {
                    debug!(error = %err, "finish after clean end failed");
                }
                return Ok(());
            }
        };

        let request: Request = wire::decode(&payload).map_err(StreamError::Decode)?;
        debug!(method = %request.method, args = request.args.len(), "dispatching");

        let response = dispatcher.respond(request).await;
        if let Response::Err(message) = &response {
            debug!(fault = %message, "call faulted");
        }

        let bytes = wire::encode(&response).map_err(StreamError::Encode)?;
        write_frame(&mut send, &bytes, max_frame_bytes).await?;
    }
}
