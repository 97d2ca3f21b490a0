//! In-memory repositories
//!
//! Four registries hold the desired and observed state. Each one guards its
//! map with its own lock and hands out snapshots, so callers may iterate while
//! supervision loops and synchronization tasks mutate concurrently.
//!
//! Operations that span registries, and therefore carry referential
//! invariants, live on [`Repository`].

mod policies;
mod policy_types;
mod rics;
mod services;

pub use policies::Policies;
pub use policy_types::PolicyTypes;
pub use rics::Rics;
pub use services::Services;

use std::sync::Arc;

use crate::error::{RepositoryError, RepositoryResult};
use crate::ric::Ric;
use crate::types::{Policy, PolicyType};

/// The registries shared by every component, passed around as `Arc<Repository>`.
#[derive(Debug, Default)]
pub struct Repository {
    /// Configured rics
    pub rics: Rics,
    /// Policy instances
    pub policies: Policies,
    /// Known policy types
    pub policy_types: PolicyTypes,
    /// Registered consumers
    pub services: Services,
}

impl Repository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty shared repository.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace a policy whose ric and type both exist.
    pub fn put_policy(&self, policy: Policy) -> RepositoryResult<()> {
        if !self.rics.contains(&policy.ric) {
            return Err(RepositoryError::ric_not_found(&policy.ric));
        }
        if !self.policy_types.contains(&policy.policy_type) {
            return Err(RepositoryError::policy_type_not_found(&policy.policy_type));
        }
        self.policies.put(policy);
        Ok(())
    }

    /// Remove a policy type that no ric reports as supported, together with
    /// every policy of that type.
    pub fn remove_policy_type(&self, name: &str) -> RepositoryResult<PolicyType> {
        if let Some(ric) = self
            .rics
            .list()
            .into_iter()
            .find(|ric| ric.is_supporting_type(name))
        {
            return Err(RepositoryError::PolicyTypeInUse {
                name: name.to_string(),
                ric: ric.name().to_string(),
            });
        }
        let removed = self
            .policy_types
            .remove(name)
            .ok_or_else(|| RepositoryError::policy_type_not_found(name))?;
        for policy in self.policies.for_type(name) {
            self.policies.remove(&policy.id);
        }
        Ok(removed)
    }

    /// Remove a ric that owns no policies.
    pub fn remove_ric(&self, name: &str) -> RepositoryResult<Arc<Ric>> {
        if !self.rics.contains(name) {
            return Err(RepositoryError::ric_not_found(name));
        }
        let count = self.policies.ids_for_ric(name).len();
        if count > 0 {
            return Err(RepositoryError::RicHasPolicies {
                name: name.to_string(),
                count,
            });
        }
        self.rics
            .remove(name)
            .ok_or_else(|| RepositoryError::ric_not_found(name))
    }

    /// Remove a ric and every policy placed in it.
    pub fn remove_ric_with_policies(&self, name: &str) -> RepositoryResult<Arc<Ric>> {
        let removed = self.policies.remove_for_ric(name);
        if !removed.is_empty() {
            tracing::debug!(ric = %name, count = removed.len(), "dropped policies of removed ric");
        }
        self.rics
            .remove(name)
            .ok_or_else(|| RepositoryError::ric_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RicConfig, Service};
    use assert_matches::assert_matches;
    use std::time::Duration;
    use tokio::time::Instant;

    fn repository() -> Repository {
        let repo = Repository::new();
        repo.rics
            .put(Arc::new(Ric::new(RicConfig::new("ric1", "http://ric1").with_managed_elements(["me1"]))));
        repo.rics.put(Arc::new(Ric::new(RicConfig::new("ric2", "http://ric2"))));
        repo.policy_types.put(PolicyType::new("t1", "{}"));
        repo.policy_types.put(PolicyType::new("t2", "{}"));
        repo
    }

    #[test]
    fn test_put_policy_requires_ric_and_type() {
        let repo = repository();

        assert_matches!(
            repo.put_policy(Policy::new("p1", "nope", "t1", "svc", "{}")),
            Err(RepositoryError::RicNotFound { .. })
        );
        assert_matches!(
            repo.put_policy(Policy::new("p1", "ric1", "nope", "svc", "{}")),
            Err(RepositoryError::PolicyTypeNotFound { .. })
        );
        assert_eq!(repo.policies.size(), 0);

        repo.put_policy(Policy::new("p1", "ric1", "t1", "svc", "{}")).unwrap();
        assert!(repo.policies.contains("p1"));
    }

    #[test]
    fn test_indexes_follow_replacement_and_removal() {
        let repo = repository();
        repo.put_policy(Policy::new("p1", "ric1", "t1", "svc-a", "{}")).unwrap();
        repo.put_policy(Policy::new("p2", "ric1", "t2", "svc-b", "{}")).unwrap();
        repo.put_policy(Policy::new("p3", "ric2", "t1", "svc-a", "{}")).unwrap();

        // Moving p1 to another ric must update the ric index.
        repo.put_policy(Policy::new("p1", "ric2", "t1", "svc-a", "{}")).unwrap();
        assert_eq!(repo.policies.ids_for_ric("ric1").len(), 1);
        assert_eq!(repo.policies.ids_for_ric("ric2").len(), 2);
        assert_eq!(repo.policies.for_service("svc-a").len(), 2);
        assert_eq!(repo.policies.for_type("t1").len(), 2);

        repo.policies.remove("p3");
        assert_eq!(repo.policies.for_service("svc-a").len(), 1);
        assert!(repo.policies.for_ric("nope").is_empty());

        let removed = repo.policies.remove_for_ric("ric2");
        assert_eq!(removed.len(), 1);
        assert_eq!(repo.policies.size(), 1);
        assert!(repo.policies.for_type("t1").is_empty());
    }

    #[test]
    fn test_type_removal_refused_while_supported() {
        let repo = repository();
        repo.rics
            .get("ric2")
            .unwrap()
            .replace_supported_types([PolicyType::new("t1", "{}")]);
        repo.put_policy(Policy::new("p1", "ric1", "t2", "svc", "{}")).unwrap();

        assert_matches!(
            repo.remove_policy_type("t1"),
            Err(RepositoryError::PolicyTypeInUse { ric, .. }) if ric == "ric2"
        );

        repo.remove_policy_type("t2").unwrap();
        assert!(!repo.policy_types.contains("t2"));
        assert!(!repo.policies.contains("p1"));
        assert_matches!(
            repo.remove_policy_type("t2"),
            Err(RepositoryError::PolicyTypeNotFound { .. })
        );
    }

    #[test]
    fn test_ric_removal_requires_no_policies() {
        let repo = repository();
        repo.put_policy(Policy::new("p1", "ric1", "t1", "svc", "{}")).unwrap();

        assert_matches!(
            repo.remove_ric("ric1"),
            Err(RepositoryError::RicHasPolicies { count: 1, .. })
        );
        assert!(repo.remove_ric("ric2").is_ok());
        assert_matches!(repo.remove_ric("ric2"), Err(RepositoryError::RicNotFound { .. }));

        repo.remove_ric_with_policies("ric1").unwrap();
        assert_eq!(repo.rics.size(), 0);
        assert_eq!(repo.policies.size(), 0);
    }

    #[test]
    fn test_policy_types_are_immutable() {
        let repo = repository();
        repo.policy_types.put(PolicyType::new("t1", "{\"changed\":true}"));
        assert_eq!(repo.policy_types.get("t1").unwrap().schema, "{}");
    }

    #[test]
    fn test_lookup_by_managed_element() {
        let repo = repository();
        assert_eq!(repo.rics.lookup_by_managed_element("me1").unwrap().name(), "ric1");
        assert!(repo.rics.lookup_by_managed_element("me9").is_none());
    }

    #[test]
    fn test_snapshot_survives_concurrent_mutation() {
        let repo = repository();
        for ric in repo.rics.list() {
            repo.rics.put(Arc::new(Ric::new(RicConfig::new(
                format!("{}-copy", ric.name()),
                ric.base_url(),
            ))));
        }
        assert_eq!(repo.rics.size(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_services_refresh_and_expiry() {
        let repo = repository();
        repo.services.put(Service::new("short", Duration::from_secs(1), ""));
        repo.services.put(Service::new("kept", Duration::from_secs(1), ""));
        repo.services.put(Service::new("forever", Duration::ZERO, ""));

        tokio::time::advance(Duration::from_millis(1500)).await;
        repo.services.refresh("kept").unwrap();
        assert_matches!(
            repo.services.refresh("ghost"),
            Err(RepositoryError::ServiceNotFound { .. })
        );

        let expired: Vec<_> = repo
            .services
            .expired(Instant::now())
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(expired, vec!["short".to_string()]);
    }
}
