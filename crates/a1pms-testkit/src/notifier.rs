//! Captures service notifications.

use std::collections::BTreeSet;

use a1pms_client::{A1Error, A1Result};
use a1pms_sync::ServiceNotifier;
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<BTreeSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications to `url` fail from now on.
    pub fn fail_for(&self, url: &str) {
        self.failing.lock().insert(url.to_string());
    }

    /// `(url, message)` of every attempted notification.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ServiceNotifier for RecordingNotifier {
    async fn notify(&self, callback_url: &str, message: &str) -> A1Result<()> {
        self.sent
            .lock()
            .push((callback_url.to_string(), message.to_string()));
        if self.failing.lock().contains(callback_url) {
            return Err(A1Error::transport(callback_url, "connection refused"));
        }
        Ok(())
    }
}
