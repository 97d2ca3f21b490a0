//! Agent wiring
//!
//! One [`Repository`] shared by the synchronization task, both supervisions
//! and the configuration refresh. Every synchronization goes through the
//! [`TrackedTrigger`], so the agent can wait for them on shutdown or in
//! one-shot mode.

use std::path::PathBuf;
use std::sync::Arc;

use a1pms_client::{A1ClientFactory, HttpClientBuilder, HttpRestClient};
use a1pms_core::Repository;
use a1pms_sync::{
    HttpNotifier, RemovalMode, RicConfigRefresh, RicSupervision, RicSynchronizationTask,
    ServiceNotifier, ServiceSupervision, SupervisionConfig, SyncOutcome, SynchronizationTrigger,
    TaskRegistry,
};
use anyhow::{Context, Result};

use crate::config::AgentConfig;
use crate::trigger::TrackedTrigger;

/// The running control plane.
pub struct Agent {
    repository: Arc<Repository>,
    controllers: Option<Arc<HttpClientBuilder>>,
    trigger: Arc<TrackedTrigger>,
    ric_supervision: Arc<RicSupervision>,
    service_supervision: Arc<ServiceSupervision>,
    config_refresh: Arc<RicConfigRefresh>,
    supervision: SupervisionConfig,
    registry: TaskRegistry,
}

impl Agent {
    /// Agent talking HTTP to the rics and controllers in `config`.
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let rest = Arc::new(HttpRestClient::new(config.http_timeout()).context("Failed to create HTTP client")?);
        let builder = Arc::new(HttpClientBuilder::with_controllers(rest, config.controllers.clone()));
        let factory = Arc::new(A1ClientFactory::new(builder.clone()));
        let supervision = config.supervision_config();
        let notifier = Arc::new(HttpNotifier::from_config(&supervision));

        let mut agent = Self::from_parts(supervision, factory, notifier, config.removal_mode());
        agent.controllers = Some(builder);
        Ok(agent)
    }

    /// Agent over an arbitrary factory and notifier.
    pub fn from_parts(
        supervision: SupervisionConfig,
        factory: Arc<A1ClientFactory>,
        notifier: Arc<dyn ServiceNotifier>,
        removal: RemovalMode,
    ) -> Self {
        let repository = Repository::shared();
        let task = RicSynchronizationTask::new(repository.clone(), factory.clone(), notifier);
        let trigger = Arc::new(TrackedTrigger::new(task));

        Self {
            ric_supervision: Arc::new(RicSupervision::new(repository.clone(), factory.clone(), trigger.clone())),
            service_supervision: Arc::new(ServiceSupervision::new(repository.clone(), factory)),
            config_refresh: Arc::new(
                RicConfigRefresh::new(repository.clone(), trigger.clone()).with_removal_mode(removal),
            ),
            repository,
            controllers: None,
            trigger,
            supervision,
            registry: TaskRegistry::new(),
        }
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    pub fn trigger(&self) -> &Arc<TrackedTrigger> {
        &self.trigger
    }

    /// Bring controllers and rics in line with `config`. New rics start
    /// synchronizing immediately.
    pub fn apply_config(&self, config: &AgentConfig) {
        apply_config(self.controllers.as_deref(), &self.config_refresh, config);
    }

    /// Start the supervision loops. With a `config_path` the file is
    /// reloaded and re-applied periodically.
    pub fn start(&self, config_path: Option<PathBuf>) {
        let supervision = self.ric_supervision.clone();
        self.registry
            .spawn_periodic("ric-supervision", self.supervision.ric_supervision_interval, move || {
                let supervision = supervision.clone();
                async move {
                    let report = supervision.check_all_rics().await;
                    tracing::debug!(triggered = report.triggered().len(), "ric supervision pass done");
                }
            });

        let services = self.service_supervision.clone();
        self.registry.spawn_periodic(
            "service-supervision",
            self.supervision.service_supervision_interval,
            move || {
                let services = services.clone();
                async move {
                    services.check_all_services().await;
                }
            },
        );

        if let Some(path) = config_path {
            let controllers = self.controllers.clone();
            let refresh = self.config_refresh.clone();
            self.registry
                .spawn_periodic("config-refresh", self.supervision.config_refresh_interval, move || {
                    let path = path.clone();
                    let controllers = controllers.clone();
                    let refresh = refresh.clone();
                    async move {
                        match AgentConfig::load(&path).await {
                            Ok(config) => apply_config(controllers.as_deref(), &refresh, &config),
                            Err(e) => tracing::warn!(error = %format!("{e:#}"), "configuration reload failed"),
                        }
                    }
                });
        }
        tracing::info!(rics = self.repository.rics.size(), "agent started");
    }

    /// Synchronize every known ric once and wait for the results.
    pub async fn synchronize_all(&self) -> Vec<(String, SyncOutcome)> {
        for ric in self.repository.rics.list() {
            self.trigger.trigger(ric);
        }
        self.trigger.wait_all().await
    }

    /// Stop the loops and abort synchronizations in flight.
    pub fn shutdown(&self) {
        self.registry.shutdown();
        self.trigger.abort_all();
        tracing::info!("agent stopped");
    }
}

fn apply_config(controllers: Option<&HttpClientBuilder>, refresh: &RicConfigRefresh, config: &AgentConfig) {
    if let Some(builder) = controllers {
        builder.set_controllers(config.controllers.clone());
    }
    for (update, error) in refresh.refresh(&config.rics) {
        tracing::warn!(update = ?update, error = %error, "configuration change not applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a1pms_core::{RicConfig, RicState};

    #[tokio::test]
    async fn test_new_agent_is_empty() {
        let agent = Agent::new(&AgentConfig::default()).unwrap();
        assert_eq!(agent.repository().rics.size(), 0);
        assert!(agent.synchronize_all().await.is_empty());
        agent.shutdown();
    }

    #[tokio::test]
    async fn test_unreachable_ric_ends_unavailable() {
        let mut config = AgentConfig::default();
        config.http.timeout_secs = 1;
        config.rics.push(RicConfig::new("ric1", "http://127.0.0.1:1"));
        let agent = Agent::new(&config).unwrap();
        agent.apply_config(&config);

        let outcomes = agent.trigger().wait_all().await;
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].1, SyncOutcome::Failed(_)));
        let ric = agent.repository().rics.get("ric1").unwrap();
        assert_eq!(ric.state(), RicState::Unavailable);
    }
}
