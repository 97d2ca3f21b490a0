//! Reactions to ric configuration changes
//!
//! A new set of [`RicConfig`]s is diffed against the repository. Added rics
//! are created and synchronized, changed ones get the new configuration and
//! removed ones are deleted once they own no policies.

use std::collections::BTreeMap;
use std::sync::Arc;

use a1pms_core::{Repository, RepositoryError, Ric, RicConfig};

use crate::synchronization::SynchronizationTrigger;

/// One configuration event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RicConfigUpdate {
    /// A ric appeared
    Added(RicConfig),
    /// A ric's URL, managed elements, controller or pinned dialect changed
    Changed(RicConfig),
    /// A ric disappeared
    Removed(String),
}

/// Events turning the repository's rics into `configs`.
pub fn diff_ric_configs(repository: &Repository, configs: &[RicConfig]) -> Vec<RicConfigUpdate> {
    let wanted: BTreeMap<&str, &RicConfig> = configs.iter().map(|c| (c.name.as_str(), c)).collect();
    let mut updates = Vec::new();

    for (name, config) in &wanted {
        match repository.rics.find(name) {
            None => updates.push(RicConfigUpdate::Added((*config).clone())),
            Some(ric) if ric.config() != **config => updates.push(RicConfigUpdate::Changed((*config).clone())),
            Some(_) => {}
        }
    }
    for name in repository.rics.names() {
        if !wanted.contains_key(name.as_str()) {
            updates.push(RicConfigUpdate::Removed(name));
        }
    }
    updates
}

/// What to do with the policies of a removed ric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalMode {
    /// Refuse removal while the ric owns policies
    #[default]
    Guarded,
    /// Drop the ric's policies along with it
    Cascade,
}

/// Applies configuration events to the repository.
pub struct RicConfigRefresh {
    repository: Arc<Repository>,
    trigger: Arc<dyn SynchronizationTrigger>,
    removal: RemovalMode,
}

impl RicConfigRefresh {
    /// Create with guarded removal.
    pub fn new(repository: Arc<Repository>, trigger: Arc<dyn SynchronizationTrigger>) -> Self {
        Self {
            repository,
            trigger,
            removal: RemovalMode::default(),
        }
    }

    /// Choose how removed rics are handled.
    pub fn with_removal_mode(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }

    /// Diff and apply. Returns the events that could not be applied.
    pub fn refresh(&self, configs: &[RicConfig]) -> Vec<(RicConfigUpdate, RepositoryError)> {
        let updates = diff_ric_configs(&self.repository, configs);
        updates
            .into_iter()
            .filter_map(|update| match self.apply(&update) {
                Ok(()) => None,
                Err(e) => Some((update, e)),
            })
            .collect()
    }

    /// Apply one event.
    pub fn apply(&self, update: &RicConfigUpdate) -> Result<(), RepositoryError> {
        match update {
            RicConfigUpdate::Added(config) => {
                let ric = Arc::new(Ric::new(config.clone()));
                self.repository.rics.put(ric.clone());
                tracing::info!(ric = %config.name, base_url = %config.base_url, "ric added");
                self.trigger.trigger(ric);
            }
            RicConfigUpdate::Changed(config) => match self.repository.rics.find(&config.name) {
                Some(ric) => {
                    ric.set_config(config.clone());
                    tracing::info!(ric = %config.name, "ric configuration changed");
                }
                None => {
                    return self.apply(&RicConfigUpdate::Added(config.clone()));
                }
            },
            RicConfigUpdate::Removed(name) => {
                let removed = match self.removal {
                    RemovalMode::Guarded => self.repository.remove_ric(name),
                    RemovalMode::Cascade => self.repository.remove_ric_with_policies(name),
                };
                match removed {
                    Ok(_) => tracing::info!(ric = %name, "ric removed"),
                    Err(e) => {
                        tracing::warn!(ric = %name, error = %e, "could not remove ric");
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }
}
