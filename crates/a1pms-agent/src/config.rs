//! Agent configuration file
//!
//! ```toml
//! [supervision]
//! ric_supervision_interval_secs = 60
//! service_supervision_interval_secs = 60
//! config_refresh_interval_secs = 60
//! cascade_ric_removal = false
//!
//! [http]
//! timeout_secs = 30
//!
//! [[controller]]
//! name = "controller1"
//! base_url = "http://sdnc:8181"
//! username = "admin"
//! password = "secret"
//!
//! [[ric]]
//! name = "ric1"
//! base_url = "http://ric1:8085"
//! managed_element_ids = ["kista_1", "kista_2"]
//! controller = "controller1"
//! ```

use std::path::Path;
use std::time::Duration;

use a1pms_core::{ControllerConfig, RicConfig};
use a1pms_sync::{RemovalMode, SupervisionConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default)]
    pub supervision: SupervisionSection,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default, rename = "controller")]
    pub controllers: Vec<ControllerConfig>,
    #[serde(default, rename = "ric")]
    pub rics: Vec<RicConfig>,
}

/// Loop intervals, in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisionSection {
    pub ric_supervision_interval_secs: u64,
    pub service_supervision_interval_secs: u64,
    pub config_refresh_interval_secs: u64,
    /// Drop the policies of rics removed from the configuration instead of
    /// keeping the ric until its policies are gone
    pub cascade_ric_removal: bool,
}

impl Default for SupervisionSection {
    fn default() -> Self {
        let defaults = SupervisionConfig::default();
        Self {
            ric_supervision_interval_secs: defaults.ric_supervision_interval.as_secs(),
            service_supervision_interval_secs: defaults.service_supervision_interval.as_secs(),
            config_refresh_interval_secs: defaults.config_refresh_interval.as_secs(),
            cascade_ric_removal: false,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: a1pms_client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl AgentConfig {
    /// Read and parse a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Parse and validate a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for ric in &self.rics {
            anyhow::ensure!(seen.insert(ric.name.as_str()), "duplicate ric name: {}", ric.name);
            anyhow::ensure!(!ric.base_url.is_empty(), "ric {} has no base_url", ric.name);
            if let Some(controller) = &ric.controller {
                anyhow::ensure!(
                    self.controllers.iter().any(|c| &c.name == controller),
                    "ric {} references unknown controller {}",
                    ric.name,
                    controller
                );
            }
        }
        let intervals = [
            self.supervision.ric_supervision_interval_secs,
            self.supervision.service_supervision_interval_secs,
            self.supervision.config_refresh_interval_secs,
        ];
        anyhow::ensure!(intervals.iter().all(|&secs| secs > 0), "supervision intervals must be positive");
        Ok(())
    }

    pub fn supervision_config(&self) -> SupervisionConfig {
        SupervisionConfig {
            ric_supervision_interval: Duration::from_secs(self.supervision.ric_supervision_interval_secs),
            service_supervision_interval: Duration::from_secs(self.supervision.service_supervision_interval_secs),
            config_refresh_interval: Duration::from_secs(self.supervision.config_refresh_interval_secs),
            notification_timeout: self.http_timeout(),
        }
    }

    pub fn removal_mode(&self) -> RemovalMode {
        if self.supervision.cascade_ric_removal {
            RemovalMode::Cascade
        } else {
            RemovalMode::Guarded
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}
