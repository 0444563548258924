//! Shared service registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::service::Service;

/// Name-to-service map shared between a server and its registrants.
///
/// Registration overwrites: the last service registered under a name wins,
/// and later calls resolve only against it. Lookups clone the `Arc` out so
/// no lock is held while a call runs.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, Arc<dyn Service>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, service: Arc<dyn Service>) {
        self.services.write().insert(name.into(), service);
    }

    /// Fetch the service registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.read().get(name).cloned()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceTable;

    #[test]
    fn test_register_and_lookup() {
        let registry = ServiceRegistry::new();
        assert!(registry.lookup("Calc").is_none());

        registry.register("Calc", Arc::new(ServiceTable::new()));
        assert!(registry.lookup("Calc").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ServiceRegistry::new();
        registry.register("Calc", Arc::new(ServiceTable::new().method("Old", || 1i64)));
        registry.register("Calc", Arc::new(ServiceTable::new().method("New", || 2i64)));

        assert_eq!(registry.len(), 1);
        let service = registry.lookup("Calc").unwrap();
        assert!(service.resolve("Old").is_none());
        assert!(service.resolve("New").is_some());
    }
}
