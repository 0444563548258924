//! Qualified-name parsing and call dispatch.

use std::sync::Arc;

use crate::fault::Fault;
use crate::registry::ServiceRegistry;
use crate::value::Value;
use crate::wire::{Request, Response};

/// Split a qualified method into its service and method parts.
///
/// The split is at the first `.`; both parts must be non-empty. Method
/// names may themselves contain dots.
pub fn parse_qualified(qualified: &str) -> Result<(&str, &str), Fault> {
    match qualified.split_once('.') {
        Some((service, method)) if !service.is_empty() && !method.is_empty() => {
            Ok((service, method))
        }
        _ => Err(Fault::InvalidMethodName(qualified.to_string())),
    }
}

/// Resolves qualified calls against a registry and invokes them.
///
/// Cheap to clone; stream handlers hold one each.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Shared registry behind this dispatcher.
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Resolve and invoke one call.
    ///
    /// Parses the qualified name, looks the service up under its registered
    /// name, resolves the bare method against the service, and invokes it.
    /// Every failure mode is a `Fault`; the caller decides how faults
    /// travel.
    pub async fn dispatch(&self, qualified: &str, args: Vec<Value>) -> Result<Value, Fault> {
        let (service_name, method_name) = parse_qualified(qualified)?;
        let service = self
            .registry
            .lookup(service_name)
            .ok_or_else(|| Fault::ServiceNotFound(service_name.to_string()))?;
        let method = service
            .resolve(method_name)
            .ok_or_else(|| Fault::MethodNotFound(method_name.to_string()))?;
        method.invoke(args).await
    }

    /// Process one request envelope into a response envelope.
    ///
    /// Faults are folded into the error arm of the response; this function
    /// itself cannot fail.
    pub async fn respond(&self, request: Request) -> Response {
        let Request { method, args } = request;
        Response::from(self.dispatch(&method, args).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_at_first_dot() {
        assert_eq!(parse_qualified("Calc.Add").unwrap(), ("Calc", "Add"));
        assert_eq!(parse_qualified("a.b.c").unwrap(), ("a", "b.c"));
    }

    #[test]
    fn test_parse_rejects_missing_dot() {
        assert_eq!(
            parse_qualified("CalcAdd").unwrap_err(),
            Fault::InvalidMethodName("CalcAdd".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(parse_qualified(".Add").is_err());
        assert!(parse_qualified("Calc.").is_err());
        assert!(parse_qualified(".").is_err());
        assert!(parse_qualified("").is_err());
    }
}
