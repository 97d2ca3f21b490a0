//! Synchronization trigger that keeps track of the runs it started.

use std::sync::Arc;

use a1pms_core::Ric;
use a1pms_sync::{RicSynchronizationTask, SyncOutcome, SynchronizationTrigger};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Spawns synchronizations and remembers them until they are awaited.
pub struct TrackedTrigger {
    task: RicSynchronizationTask,
    running: Mutex<Vec<(String, JoinHandle<SyncOutcome>)>>,
}

impl TrackedTrigger {
    pub fn new(task: RicSynchronizationTask) -> Self {
        Self {
            task,
            running: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every run started so far. A run that panicked or was
    /// aborted is left out.
    pub async fn wait_all(&self) -> Vec<(String, SyncOutcome)> {
        let running = std::mem::take(&mut *self.running.lock());
        let mut outcomes = Vec::with_capacity(running.len());
        for (ric, handle) in running {
            match handle.await {
                Ok(outcome) => outcomes.push((ric, outcome)),
                Err(e) => tracing::warn!(ric = %ric, error = %e, "synchronization task did not finish"),
            }
        }
        outcomes
    }

    /// Abort every run still in flight.
    pub fn abort_all(&self) {
        for (_, handle) in self.running.lock().drain(..) {
            handle.abort();
        }
    }
}

impl SynchronizationTrigger for TrackedTrigger {
    fn trigger(&self, ric: Arc<Ric>) {
        let name = ric.name().to_string();
        let handle = self.task.spawn(ric);
        let mut running = self.running.lock();
        running.retain(|(_, handle)| !handle.is_finished());
        running.push((name, handle));
    }
}
