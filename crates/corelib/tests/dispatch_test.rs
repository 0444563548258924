//! Comprehensive tests for registry-backed dispatch.
//!
//! # Test Strategy
//!
//! 1. **Name resolution**: qualified parsing through full dispatch
//! 2. **Calculator semantics**: arithmetic results and call-level faults
//! 3. **Registration**: overwrite behavior, live updates
//! 4. **Envelopes**: request-to-response folding

use std::sync::Arc;

use corelib::{Dispatcher, Fault, Request, Response, ServiceRegistry, ServiceTable, Value};

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

fn dispatcher_with_calculator() -> Dispatcher {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register("Calculator", Arc::new(calculator()));
    Dispatcher::new(registry)
}

// ============================================================================
// Name Resolution Tests
// ============================================================================

#[tokio::test]
async fn test_unregistered_service() {
    // A syntactically valid name against an empty registry
    let dispatcher = Dispatcher::new(Arc::new(ServiceRegistry::new()));
    let fault = dispatcher
        .dispatch("Unregistered.Anything", vec![])
        .await
        .unwrap_err();
    assert_eq!(fault, Fault::ServiceNotFound("Unregistered".to_string()));
    assert_eq!(fault.to_string(), "service not found: Unregistered");
}

#[tokio::test]
async fn test_unknown_method_on_known_service() {
    let dispatcher = dispatcher_with_calculator();
    let fault = dispatcher
        .dispatch("Calculator.Power", vec![])
        .await
        .unwrap_err();
    assert_eq!(fault, Fault::MethodNotFound("Power".to_string()));
}

#[tokio::test]
async fn test_unqualified_name_rejected() {
    // No dot at all: rejected before any registry access
    let dispatcher = dispatcher_with_calculator();
    let fault = dispatcher.dispatch("CalculatorAdd", vec![]).await.unwrap_err();
    assert_eq!(fault, Fault::InvalidMethodName("CalculatorAdd".to_string()));
}

#[tokio::test]
async fn test_method_names_may_contain_dots() {
    // Split happens at the first dot only
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(
        "Ns",
        Arc::new(ServiceTable::new().method("math.add", |a: i64, b: i64| a + b)),
    );
    let dispatcher = Dispatcher::new(registry);

    let result = dispatcher
        .dispatch("Ns.math.add", vec![Value::Int(2), Value::Int(3)])
        .await;
    assert_eq!(result.unwrap(), Value::Int(5));
}

// ============================================================================
// Calculator Semantics Tests
// ============================================================================

#[tokio::test]
async fn test_add() {
    let dispatcher = dispatcher_with_calculator();
    let result = dispatcher
        .dispatch("Calculator.Add", vec![Value::Int(10), Value::Int(20)])
        .await;
    assert_eq!(result.unwrap(), Value::Int(30), "10 + 20 should be 30");
}

#[tokio::test]
async fn test_divide_by_zero_fault_message() {
    // The application fault message must reach the caller verbatim
    let dispatcher = dispatcher_with_calculator();
    let fault = dispatcher
        .dispatch("Calculator.Divide", vec![Value::Int(10), Value::Int(0)])
        .await
        .unwrap_err();
    assert_eq!(fault.to_string(), "division by zero");
}

#[tokio::test]
async fn test_divide() {
    let dispatcher = dispatcher_with_calculator();
    let result = dispatcher
        .dispatch("Calculator.Divide", vec![Value::Int(10), Value::Int(2)])
        .await;
    assert_eq!(result.unwrap(), Value::Float(5.0));
}

#[tokio::test]
async fn test_argument_mismatch_is_fault_not_panic() {
    let dispatcher = dispatcher_with_calculator();
    let fault = dispatcher
        .dispatch(
            "Calculator.Add",
            vec![Value::Str("ten".to_string()), Value::Int(20)],
        )
        .await
        .unwrap_err();
    assert!(matches!(fault, Fault::ArgumentTypeMismatch(_)));
}

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_last_registration_wins_through_dispatch() {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register("Calc", Arc::new(ServiceTable::new().method("Answer", || 1i64)));
    registry.register("Calc", Arc::new(ServiceTable::new().method("Answer", || 42i64)));
    let dispatcher = Dispatcher::new(registry);

    let result = dispatcher.dispatch("Calc.Answer", vec![]).await;
    assert_eq!(result.unwrap(), Value::Int(42), "Latest registration should serve");
}

#[tokio::test]
async fn test_registration_visible_to_existing_dispatcher() {
    // Registering after the dispatcher exists must affect later calls
    let registry = Arc::new(ServiceRegistry::new());
    let dispatcher = Dispatcher::new(registry.clone());

    let fault = dispatcher.dispatch("Late.Ping", vec![]).await.unwrap_err();
    assert!(matches!(fault, Fault::ServiceNotFound(_)));

    registry.register("Late", Arc::new(ServiceTable::new().method("Ping", || ())));
    let result = dispatcher.dispatch("Late.Ping", vec![]).await;
    assert_eq!(result.unwrap(), Value::Unit);
}

// ============================================================================
// Envelope Tests
// ============================================================================

#[tokio::test]
async fn test_respond_folds_success() {
    let dispatcher = dispatcher_with_calculator();
    let response = dispatcher
        .respond(Request::new(
            "Calculator.Multiply",
            vec![Value::Int(6), Value::Int(7)],
        ))
        .await;
    assert_eq!(response, Response::Ok(Value::Int(42)));
}

#[tokio::test]
async fn test_respond_folds_fault_to_error_arm() {
    let dispatcher = dispatcher_with_calculator();
    let response = dispatcher
        .respond(Request::new(
            "Calculator.Divide",
            vec![Value::Int(1), Value::Int(0)],
        ))
        .await;
    assert_eq!(response, Response::Err("division by zero".to_string()));
}
