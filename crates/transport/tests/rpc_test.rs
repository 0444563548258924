//! End-to-end tests over loopback QUIC.
//!
//! # Test Strategy
//!
//! 1. **Arithmetic round trips**: results cross the wire intact
//! 2. **Fault propagation**: call-level errors arrive verbatim
//! 3. **Concurrency**: parallel calls never cross-talk
//! 4. **Stream lifecycle**: one-shot and channel modes
//! 5. **Registration**: live overwrite visible to a running server

use std::net::SocketAddr;
use std::sync::Arc;

use corelib::{Fault, ServiceRegistry, ServiceTable, Value};
use transport::{CallError, Client, ClientOptions, FrameError, Server};

fn calculator() -> ServiceTable {
    ServiceTable::new()
        .method("Add", |a: i64, b: i64| a + b)
        .method("Subtract", |a: i64, b: i64| a - b)
        .method("Multiply", |a: i64, b: i64| a * b)
        .method("Divide", |a: i64, b: i64| {
            if b == 0 {
                return Err(Fault::invocation("division by zero"));
            }
            Ok(a as f64 / b as f64)
        })
}

fn spawn_server() -> (SocketAddr, Arc<ServiceRegistry>) {
    let server = Server::new();
    server.register("Calculator", Arc::new(calculator()));
    let registry = server.registry();
    let listener = server.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr();
    tokio::spawn(listener.run());
    (addr, registry)
}

async fn connect(addr: SocketAddr) -> Client {
    Client::connect(addr, ClientOptions::default())
        .await
        .expect("client should connect to loopback server")
}

// ============================================================================
// Arithmetic Round Trips
// ============================================================================

#[tokio::test]
async fn test_multiply_round_trip() {
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let value = client.call("Calculator.Multiply", (6i64, 7i64)).await.unwrap();
    assert_eq!(value, Value::Int(42));
}

#[tokio::test]
async fn test_subtract_negative_result() {
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let value = client.call("Calculator.Subtract", (5i64, 9i64)).await.unwrap();
    assert_eq!(value, Value::Int(-4));
}

#[tokio::test]
async fn test_explicit_value_arguments() {
    // Vec<Value> argument packs behave the same as tuples
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let value = client
        .call("Calculator.Add", vec![Value::Int(10), Value::Int(20)])
        .await
        .unwrap();
    assert_eq!(value, Value::Int(30));
}

// ============================================================================
// Fault Propagation
// ============================================================================

#[tokio::test]
async fn test_division_by_zero_message_verbatim() {
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let err = client
        .call("Calculator.Divide", (10i64, 0i64))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "division by zero");
    assert_eq!(err.remote_message(), Some("division by zero"));
}

#[tokio::test]
async fn test_service_not_found() {
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let err = client.call("Missing.Anything", ()).await.unwrap_err();
    assert_eq!(err.remote_message(), Some("service not found: Missing"));
}

#[tokio::test]
async fn test_invalid_method_name() {
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let err = client.call("JustAName", ()).await.unwrap_err();
    assert_eq!(
        err.remote_message(),
        Some("invalid service method: JustAName")
    );
}

#[tokio::test]
async fn test_wrong_argument_type_is_fault() {
    // A bad argument faults the call, not the stream or the server
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let err = client
        .call("Calculator.Add", ("ten", 20i64))
        .await
        .unwrap_err();
    let message = err.remote_message().expect("should be a remote fault");
    assert!(
        message.starts_with("argument type mismatch"),
        "unexpected fault: {}",
        message
    );

    // The session stays usable afterwards
    let value = client.call("Calculator.Add", (1i64, 2i64)).await.unwrap();
    assert_eq!(value, Value::Int(3));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_calls_are_isolated() {
    // Many in-flight calls on one session; each must get its own answer
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let mut handles = Vec::new();
    for i in 0..16i64 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let value = client
                .call("Calculator.Add", (i, 1000i64))
                .await
                .unwrap();
            assert_eq!(value, Value::Int(i + 1000), "call {} got the wrong answer", i);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

// ============================================================================
// Stream Lifecycle
// ============================================================================

#[tokio::test]
async fn test_channel_survives_fault_between_calls() {
    // A fault response ends the call, never the stream loop
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let mut channel = client.channel().await.unwrap();
    let value = channel.call("Calculator.Add", (1i64, 2i64)).await.unwrap();
    assert_eq!(value, Value::Int(3));

    let err = channel
        .call("Calculator.Divide", (1i64, 0i64))
        .await
        .unwrap_err();
    assert_eq!(err.remote_message(), Some("division by zero"));

    let value = channel
        .call("Calculator.Multiply", (6i64, 7i64))
        .await
        .unwrap();
    assert_eq!(value, Value::Int(42));

    channel.finish().await.unwrap();
}

#[tokio::test]
async fn test_oversize_request_rejected_locally() {
    let (addr, _registry) = spawn_server();
    let client = connect(addr).await;

    let blob = vec![0u8; 2 * 1024 * 1024];
    let err = client.call("Calculator.Add", (blob,)).await.unwrap_err();
    assert!(matches!(
        err,
        CallError::Frame(FrameError::TooLarge { .. })
    ));
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_reregistration_visible_live() {
    let (addr, registry) = spawn_server();
    let client = connect(addr).await;

    registry.register("Oracle", Arc::new(ServiceTable::new().method("Answer", || 1i64)));
    let value = client.call("Oracle.Answer", ()).await.unwrap();
    assert_eq!(value, Value::Int(1));

    // Overwrite while the server is live; later calls see only the new one
    registry.register("Oracle", Arc::new(ServiceTable::new().method("Answer", || 42i64)));
    let value = client.call("Oracle.Answer", ()).await.unwrap();
    assert_eq!(value, Value::Int(42));
}

#[tokio::test]
async fn test_unit_result_crosses_wire() {
    let (addr, registry) = spawn_server();
    registry.register("Probe", Arc::new(ServiceTable::new().method("Ping", || ())));
    let client = connect(addr).await;

    let value = client.call("Probe.Ping", ()).await.unwrap();
    assert_eq!(value, Value::Unit);
}
