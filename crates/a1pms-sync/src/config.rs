//! Supervision configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Periods of the background loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionConfig {
    /// Between two drift checks over all rics
    pub ric_supervision_interval: Duration,
    /// Between two service expiry sweeps
    pub service_supervision_interval: Duration,
    /// Between two configuration reloads
    pub config_refresh_interval: Duration,
    /// Timeout for notification requests
    pub notification_timeout: Duration,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            ric_supervision_interval: Duration::from_secs(60),
            service_supervision_interval: Duration::from_secs(60),
            config_refresh_interval: Duration::from_secs(60),
            notification_timeout: Duration::from_secs(30),
        }
    }
}

impl SupervisionConfig {
    /// Short periods for tests.
    pub fn for_testing() -> Self {
        Self {
            ric_supervision_interval: Duration::from_millis(100),
            service_supervision_interval: Duration::from_millis(100),
            config_refresh_interval: Duration::from_millis(100),
            notification_timeout: Duration::from_secs(1),
        }
    }
}
