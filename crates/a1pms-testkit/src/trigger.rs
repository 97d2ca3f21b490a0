//! Captures synchronization triggers instead of running them.

use std::sync::Arc;

use a1pms_core::Ric;
use a1pms_sync::SynchronizationTrigger;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct RecordingTrigger {
    triggered: Mutex<Vec<String>>,
}

impl RecordingTrigger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Names of the triggered rics, in order.
    pub fn triggered(&self) -> Vec<String> {
        self.triggered.lock().clone()
    }

    pub fn count_for(&self, ric: &str) -> usize {
        self.triggered.lock().iter().filter(|name| *name == ric).count()
    }
}

impl SynchronizationTrigger for RecordingTrigger {
    fn trigger(&self, ric: Arc<Ric>) {
        self.triggered.lock().push(ric.name().to_string());
    }
}
