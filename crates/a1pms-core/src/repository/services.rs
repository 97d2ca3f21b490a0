//! Registry of policy consumers.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::error::{RepositoryError, RepositoryResult};
use crate::types::Service;

/// Services keyed by name.
#[derive(Debug, Default)]
pub struct Services {
    services: RwLock<BTreeMap<String, Service>>,
}

impl Services {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a service.
    pub fn put(&self, service: Service) {
        self.services.write().insert(service.name.clone(), service);
    }

    /// Service by name.
    pub fn get(&self, name: &str) -> RepositoryResult<Service> {
        self.find(name)
            .ok_or_else(|| RepositoryError::service_not_found(name))
    }

    /// Service by name, if present.
    pub fn find(&self, name: &str) -> Option<Service> {
        self.services.read().get(name).cloned()
    }

    /// Heartbeat: restart the keep-alive of a registered service.
    pub fn refresh(&self, name: &str) -> RepositoryResult<()> {
        let mut services = self.services.write();
        let service = services
            .get_mut(name)
            .ok_or_else(|| RepositoryError::service_not_found(name))?;
        service.refresh();
        Ok(())
    }

    /// Remove a service. Its policies are not touched.
    pub fn remove(&self, name: &str) -> Option<Service> {
        self.services.write().remove(name)
    }

    /// Snapshot of all services.
    pub fn list(&self) -> Vec<Service> {
        self.services.read().values().cloned().collect()
    }

    /// Services whose keep-alive has elapsed at `now`.
    pub fn expired(&self, now: Instant) -> Vec<Service> {
        self.services
            .read()
            .values()
            .filter(|service| service.is_expired_at(now))
            .cloned()
            .collect()
    }

    /// Number of services.
    pub fn size(&self) -> usize {
        self.services.read().len()
    }
}
