//! Client sessions and call paths.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use quinn::{Connection, Endpoint, RecvStream, SendStream};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use corelib::{wire, IntoValue, Request, Response, Value};

use crate::config::ClientOptions;
use crate::error::{CallError, ConnectError};
use crate::framing::{read_frame, write_frame, FrameError};
use crate::tls;

/// Argument pack for one call.
///
/// Implemented for `Vec<Value>` and for tuples of convertible values, so
/// `client.call("Calculator.Add", (10i64, 20i64))` reads naturally.
pub trait IntoArguments {
    fn into_arguments(self) -> Vec<Value>;
}

impl IntoArguments for Vec<Value> {
    fn into_arguments(self) -> Vec<Value> {
        self
    }
}

impl IntoArguments for () {
    fn into_arguments(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_into_arguments {
    ($($idx:tt => $name:ident),*) => {
        impl<$($name: IntoValue),*> IntoArguments for ($($name,)*) {
            fn into_arguments(self) -> Vec<Value> {
                vec![$(self.$idx.into_value()),*]
            }
        }
    };
}

impl_into_arguments!(0 => A1);
impl_into_arguments!(0 => A1, 1 => A2);
impl_into_arguments!(0 => A1, 1 => A2, 2 => A3);
impl_into_arguments!(0 => A1, 1 => A2, 2 => A3, 3 => A4);
impl_into_arguments!(0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5);
impl_into_arguments!(0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5, 5 => A6);
impl_into_arguments!(0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5, 5 => A6, 6 => A7);
impl_into_arguments!(0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5, 5 => A6, 6 => A7, 7 => A8);

/// RPC client holding one QUIC session.
///
/// Cloning is cheap and shares the session; calls from clones run on
/// independent streams.
#[derive(Clone)]
pub struct Client {
    endpoint: Endpoint,
    connection: Connection,
    max_frame_bytes: usize,
}

impl Client {
    /// Dial `addr` and complete the QUIC handshake.
    pub async fn connect(addr: SocketAddr, options: ClientOptions) -> Result<Self, ConnectError> {
        let bind = match addr {
            SocketAddr::V4(_) => SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0),
            SocketAddr::V6(_) => SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0),
        };
        let mut endpoint = Endpoint::client(bind)?;

        let mut config = match options.tls {
            Some(tls) => tls,
            None => tls::insecure_client_config(),
        };
        if let Some(transport) = options.transport {
            config.transport_config(transport);
        }
        endpoint.set_default_client_config(config);

        let connection = endpoint.connect(addr, &options.server_name)?.await?;
        debug!(remote = %connection.remote_address(), "session established");
        Ok(Self {
            endpoint,
            connection,
            max_frame_bytes: options.max_frame_bytes,
        })
    }

    /// Issue one call on a dedicated stream.
    ///
    /// Opens a bidirectional stream, writes the request, finishes the send
    /// side, and blocks until the response envelope arrives. A fault
    /// transmitted by the server surfaces as [`CallError::Remote`].
    pub async fn call(
        &self,
        method: impl Into<String>,
        args: impl IntoArguments,
    ) -> Result<Value, CallError> {
        let (mut send, mut recv) = self
            .connection
            .open_bi()
            .await
            .map_err(CallError::StreamOpen)?;

        let request = Request::new(method, args.into_arguments());
        send_request(&mut send, &request, self.max_frame_bytes).await?;
        send.shutdown().await.map_err(FrameError::Io)?;

        read_response(&mut recv, self.max_frame_bytes).await
    }

    /// Open a persistent channel carrying sequential calls on one stream.
    pub async fn channel(&self) -> Result<CallChannel, CallError> {
        let (send, recv) = self
            .connection
            .open_bi()
            .await
            .map_err(CallError::StreamOpen)?;
        Ok(CallChannel {
            send,
            recv,
            max_frame_bytes: self.max_frame_bytes,
        })
    }

    /// Remote address of the session.
    pub fn remote_address(&self) -> SocketAddr {
        self.connection.remote_address()
    }

    /// Close the session immediately; in-flight calls fail.
    pub fn close(&self) {
        self.connection.close(0u32.into(), b"client closed");
    }

    /// Wait until the endpoint has fully shut down.
    pub async fn wait_idle(&self) {
        self.endpoint.wait_idle().await;
    }
}

/// Sequential calls multiplexed onto one stream.
///
/// The server answers in order; each call blocks until its own response
/// arrives. Dropping the channel without `finish` closes the stream
/// abruptly, which the server logs as a failed loop.
pub struct CallChannel {
    send: SendStream,
    recv: RecvStream,
    max_frame_bytes: usize,
}

impl CallChannel {
    /// Issue one call and wait for its response.
    pub async fn call(
        &mut self,
        method: impl Into<String>,
        args: impl IntoArguments,
    ) -> Result<Value, CallError> {
        let request = Request::new(method, args.into_arguments());
        send_request(&mut self.send, &request, self.max_frame_bytes).await?;
        read_response(&mut self.recv, self.max_frame_bytes).await
    }

    /// Finish the send side so the server ends the stream cleanly.
    pub async fn finish(mut self) -> Result<(), CallError> {
        self.send.shutdown().await.map_err(FrameError::Io)?;
        Ok(())
    }
}

async fn send_request(
    send: &mut SendStream,
    request: &Request,
    limit: usize,
) -> Result<(), CallError> {
    let bytes = wire::encode(request).map_err(CallError::Encode)?;
    write_frame(send, &bytes, limit).await?;
    Ok(())
}

async fn read_response(recv: &mut RecvStream, limit: usize) -> Result<Value, CallError> {
    let payload = read_frame(recv, limit).await?.ok_or(CallError::NoResponse)?;
    let response: Response = wire::decode(&payload).map_err(CallError::Decode)?;
    response.into_result().map_err(CallError::Remote)
}
