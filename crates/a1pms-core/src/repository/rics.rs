//! Registry of configured rics.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::ric::Ric;

/// Rics keyed by name.
#[derive(Debug, Default)]
pub struct Rics {
    rics: RwLock<BTreeMap<String, Arc<Ric>>>,
}

impl Rics {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a ric.
    pub fn put(&self, ric: Arc<Ric>) {
        self.rics.write().insert(ric.name().to_string(), ric);
    }

    /// Ric by name.
    pub fn get(&self, name: &str) -> RepositoryResult<Arc<Ric>> {
        self.find(name)
            .ok_or_else(|| RepositoryError::ric_not_found(name))
    }

    /// Ric by name, if present.
    pub fn find(&self, name: &str) -> Option<Arc<Ric>> {
        self.rics.read().get(name).cloned()
    }

    /// Whether a ric with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.rics.read().contains_key(name)
    }

    /// Snapshot of all rics; safe to iterate while others mutate the registry.
    pub fn list(&self) -> Vec<Arc<Ric>> {
        self.rics.read().values().cloned().collect()
    }

    /// Names of all rics.
    pub fn names(&self) -> Vec<String> {
        self.rics.read().keys().cloned().collect()
    }

    /// The ric controlling a managed element.
    pub fn lookup_by_managed_element(&self, managed_element_id: &str) -> Option<Arc<Ric>> {
        self.rics
            .read()
            .values()
            .find(|ric| ric.is_managing(managed_element_id))
            .cloned()
    }

    /// Number of rics.
    pub fn size(&self) -> usize {
        self.rics.read().len()
    }

    pub(crate) fn remove(&self, name: &str) -> Option<Arc<Ric>> {
        self.rics.write().remove(name)
    }
}
