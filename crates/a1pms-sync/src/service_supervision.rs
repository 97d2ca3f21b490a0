//! Expiry of services that stopped sending heartbeats.
//!
//! An expired service loses every policy it owns, in the repository and in
//! the RIC, and is then removed. Remote deletes run under the owning ric's
//! shared lock and are best effort.

use std::sync::Arc;

use a1pms_client::{A1ClientFactory, A1Result};
use a1pms_core::{Policy, Repository, Service};
use futures::future::join_all;
use tokio::time::Instant;

/// Periodic sweeper for expired services.
pub struct ServiceSupervision {
    repository: Arc<Repository>,
    factory: Arc<A1ClientFactory>,
}

impl ServiceSupervision {
    /// Create the sweeper.
    pub fn new(repository: Arc<Repository>, factory: Arc<A1ClientFactory>) -> Self {
        Self {
            repository,
            factory,
        }
    }

    /// Expire every service whose keep-alive has elapsed. Returns the names
    /// of the removed services. Services and their remote deletes are
    /// handled concurrently.
    pub async fn check_all_services(&self) -> Vec<String> {
        let now = Instant::now();
        let expired = join_all(self.repository.services.expired(now).into_iter().map(|service| async move {
            // A heartbeat may have arrived since the snapshot was taken.
            let still_expired = self
                .repository
                .services
                .find(&service.name)
                .is_some_and(|current| current.is_expired_at(now));
            if !still_expired {
                return None;
            }
            tracing::info!(service = %service.name, "Service is expired");
            self.expire(&service).await;
            Some(service.name)
        }))
        .await;
        expired.into_iter().flatten().collect()
    }

    async fn expire(&self, service: &Service) {
        let policies = self.repository.policies.for_service(&service.name);
        for policy in &policies {
            self.repository.policies.remove(&policy.id);
        }
        join_all(policies.iter().map(|policy| async move {
            if let Err(e) = self.delete_in_ric(policy).await {
                tracing::warn!(
                    policy = %policy.id,
                    ric = %policy.ric,
                    error = %e,
                    "could not delete policy in ric"
                );
            }
        }))
        .await;
        self.repository.services.remove(&service.name);
    }

    async fn delete_in_ric(&self, policy: &Policy) -> A1Result<()> {
        let Some(ric) = self.repository.rics.find(&policy.ric) else {
            tracing::debug!(policy = %policy.id, ric = %policy.ric, "ric gone, nothing to delete");
            return Ok(());
        };
        let _lock = ric.lock().lock_shared().await;
        let client = self.factory.create_client(&ric).await?;
        if let Err(e) = client.delete_policy(policy).await {
            ric.reset_protocol();
            return Err(e);
        }
        Ok(())
    }
}
