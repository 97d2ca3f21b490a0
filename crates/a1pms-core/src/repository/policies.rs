//! Registry of policy instances with secondary indexes by ric, service and type.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::types::Policy;

#[derive(Debug, Default)]
struct PolicyIndex {
    by_id: BTreeMap<String, Policy>,
    by_ric: HashMap<String, BTreeSet<String>>,
    by_service: HashMap<String, BTreeSet<String>>,
    by_type: HashMap<String, BTreeSet<String>>,
}

impl PolicyIndex {
    fn insert(&mut self, policy: Policy) {
        self.remove(&policy.id);
        index(&mut self.by_ric, &policy.ric, &policy.id);
        index(&mut self.by_service, &policy.owner_service, &policy.id);
        index(&mut self.by_type, &policy.policy_type, &policy.id);
        self.by_id.insert(policy.id.clone(), policy);
    }

    fn remove(&mut self, id: &str) -> Option<Policy> {
        let policy = self.by_id.remove(id)?;
        unindex(&mut self.by_ric, &policy.ric, id);
        unindex(&mut self.by_service, &policy.owner_service, id);
        unindex(&mut self.by_type, &policy.policy_type, id);
        Some(policy)
    }

    fn collect(&self, ids: Option<&BTreeSet<String>>) -> Vec<Policy> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

fn index(map: &mut HashMap<String, BTreeSet<String>>, key: &str, id: &str) {
    map.entry(key.to_string()).or_default().insert(id.to_string());
}

fn unindex(map: &mut HashMap<String, BTreeSet<String>>, key: &str, id: &str) {
    if let Some(ids) = map.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}

/// Policies keyed by id.
///
/// Inserting is only possible through [`crate::Repository::put_policy`],
/// which checks that the referenced ric and type exist.
#[derive(Debug, Default)]
pub struct Policies {
    index: RwLock<PolicyIndex>,
}

impl Policies {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy by id.
    pub fn get(&self, id: &str) -> RepositoryResult<Policy> {
        self.find(id)
            .ok_or_else(|| RepositoryError::policy_not_found(id))
    }

    /// Policy by id, if present.
    pub fn find(&self, id: &str) -> Option<Policy> {
        self.index.read().by_id.get(id).cloned()
    }

    /// Whether a policy with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.read().by_id.contains_key(id)
    }

    /// Policies placed in a ric.
    pub fn for_ric(&self, ric: &str) -> Vec<Policy> {
        let index = self.index.read();
        index.collect(index.by_ric.get(ric))
    }

    /// Ids of the policies placed in a ric.
    pub fn ids_for_ric(&self, ric: &str) -> BTreeSet<String> {
        self.index
            .read()
            .by_ric
            .get(ric)
            .cloned()
            .unwrap_or_default()
    }

    /// Policies owned by a service.
    pub fn for_service(&self, service: &str) -> Vec<Policy> {
        let index = self.index.read();
        index.collect(index.by_service.get(service))
    }

    /// Policies of a type.
    pub fn for_type(&self, policy_type: &str) -> Vec<Policy> {
        let index = self.index.read();
        index.collect(index.by_type.get(policy_type))
    }

    /// Remove one policy.
    pub fn remove(&self, id: &str) -> Option<Policy> {
        self.index.write().remove(id)
    }

    /// Remove every policy placed in a ric.
    pub fn remove_for_ric(&self, ric: &str) -> Vec<Policy> {
        let mut index = self.index.write();
        let ids = index.by_ric.get(ric).cloned().unwrap_or_default();
        ids.iter().filter_map(|id| index.remove(id)).collect()
    }

    /// Snapshot of all policies.
    pub fn list(&self) -> Vec<Policy> {
        self.index.read().by_id.values().cloned().collect()
    }

    /// Number of policies.
    pub fn size(&self) -> usize {
        self.index.read().by_id.len()
    }

    pub(crate) fn put(&self, policy: Policy) {
        self.index.write().insert(policy);
    }
}
