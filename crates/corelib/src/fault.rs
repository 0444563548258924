//! Call-level faults reported to remote callers.
//!
//! A fault crosses the wire as the plain message of an error response, so
//! `Display` is the wire format: no codes, no structured cause chain, just
//! the text the caller sees.

use std::fmt;

/// Errors raised while resolving or invoking a remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Qualified name did not split into non-empty service and method parts
    InvalidMethodName(String),
    /// No service registered under the requested name
    ServiceNotFound(String),
    /// Service has no method under the requested name
    MethodNotFound(String),
    /// Argument count or an argument type did not match the handler
    ArgumentTypeMismatch(String),
    /// Handler ran and reported an application error
    Invocation(String),
}

impl Fault {
    /// Application-level fault; the message is delivered to the caller
    /// verbatim.
    pub fn invocation(message: impl Into<String>) -> Self {
        Fault::Invocation(message.into())
    }

    /// Fault for a positional argument that failed conversion.
    pub fn argument(index: usize, detail: impl fmt::Display) -> Self {
        Fault::ArgumentTypeMismatch(format!("argument {}: {}", index, detail))
    }

    /// Fault for a call with the wrong number of arguments.
    pub fn arity(expected: usize, found: usize) -> Self {
        Fault::ArgumentTypeMismatch(format!(
            "expected {} arguments, found {}",
            expected, found
        ))
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::InvalidMethodName(name) => write!(f, "invalid service method: {}", name),
            Fault::ServiceNotFound(name) => write!(f, "service not found: {}", name),
            Fault::MethodNotFound(name) => write!(f, "method not found: {}", name),
            Fault::ArgumentTypeMismatch(msg) => write!(f, "argument type mismatch: {}", msg),
            Fault::Invocation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Fault {}
