//! Registry of known policy types.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::types::PolicyType;

/// Policy types keyed by name.
#[derive(Debug, Default)]
pub struct PolicyTypes {
    types: RwLock<BTreeMap<String, PolicyType>>,
}

impl PolicyTypes {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a type. Types are immutable, so an existing entry is kept.
    pub fn put(&self, policy_type: PolicyType) {
        self.types
            .write()
            .entry(policy_type.name.clone())
            .or_insert(policy_type);
    }

    /// Type by name.
    pub fn get(&self, name: &str) -> RepositoryResult<PolicyType> {
        self.find(name)
            .ok_or_else(|| RepositoryError::policy_type_not_found(name))
    }

    /// Type by name, if present.
    pub fn find(&self, name: &str) -> Option<PolicyType> {
        self.types.read().get(name).cloned()
    }

    /// Whether the type is known.
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Snapshot of all types.
    pub fn list(&self) -> Vec<PolicyType> {
        self.types.read().values().cloned().collect()
    }

    /// Number of types.
    pub fn size(&self) -> usize {
        self.types.read().len()
    }

    pub(crate) fn remove(&self, name: &str) -> Option<PolicyType> {
        self.types.write().remove(name)
    }
}
