//! Service notification sink
//!
//! After a ric is synchronized every service with a callback URL receives a
//! `PUT` with a plain-text completion message. Failures are reported to the
//! caller, which logs them and moves on.

use std::time::Duration;

use a1pms_client::{A1Result, HttpRestClient};
use async_trait::async_trait;

use crate::config::SupervisionConfig;

/// Delivers completion messages to service callbacks.
#[async_trait]
pub trait ServiceNotifier: Send + Sync {
    /// Send `message` to `callback_url`.
    async fn notify(&self, callback_url: &str, message: &str) -> A1Result<()>;
}

/// Message sent once a ric has been synchronized.
pub fn synchronization_completed_message(ric_name: &str) -> String {
    format!("Synchronization completed for:{ric_name}")
}

/// Notifies over HTTP with a client created per notification.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    timeout: Duration,
}

impl HttpNotifier {
    /// Notifier whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Notifier using the configured notification timeout.
    pub fn from_config(config: &SupervisionConfig) -> Self {
        Self::new(config.notification_timeout)
    }
}

#[async_trait]
impl ServiceNotifier for HttpNotifier {
    async fn notify(&self, callback_url: &str, message: &str) -> A1Result<()> {
        let client = HttpRestClient::new(self.timeout)?;
        client.put_text(callback_url, message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_message() {
        assert_eq!(
            synchronization_completed_message("ric1"),
            "Synchronization completed for:ric1"
        );
    }

    #[test]
    fn test_timeout_follows_supervision_config() {
        let config = SupervisionConfig {
            notification_timeout: Duration::from_secs(7),
            ..SupervisionConfig::default()
        };
        assert_eq!(HttpNotifier::from_config(&config).timeout, Duration::from_secs(7));
    }
}
