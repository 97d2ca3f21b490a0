//! RIC synchronization
//!
//! Drives one RIC back to the desired state held in the repository:
//!
//! 1. enter `SYNCHRONIZING` (a run already in flight makes this a no-op)
//! 2. take the ric's lock exclusively for the whole run
//! 3. obtain an adapter through the factory
//! 4. delete everything on the RIC, retrying once
//! 5. refresh the supported policy types from the RIC
//! 6. recreate every confirmed policy, best effort
//! 7. notify services that registered a callback
//! 8. leave the ric `AVAILABLE`
//!
//! Any failure in steps 3-5 leaves the ric `UNAVAILABLE`. Transient policies
//! of the ric are discarded as soon as the lock is held, whatever the outcome.

use std::sync::Arc;

use a1pms_client::{A1Client, A1ClientFactory, A1Result};
use a1pms_core::{PolicyType, Repository, Ric};
use futures::TryStreamExt;
use tokio::task::JoinHandle;

use crate::error::{SyncError, SyncResult};
use crate::notifier::{synchronization_completed_message, ServiceNotifier};

/// Result of one synchronization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The ric is `AVAILABLE`
    Completed,
    /// Another run owned the ric; nothing was done
    AlreadyRunning,
    /// The ric is `UNAVAILABLE`
    Failed(SyncError),
}

/// Starts synchronization of a ric without waiting for it.
pub trait SynchronizationTrigger: Send + Sync {
    /// Fire and forget.
    fn trigger(&self, ric: Arc<Ric>);
}

/// Reconciles one RIC with the repository.
#[derive(Clone)]
pub struct RicSynchronizationTask {
    repository: Arc<Repository>,
    factory: Arc<A1ClientFactory>,
    notifier: Arc<dyn ServiceNotifier>,
}

impl RicSynchronizationTask {
    /// Create the task.
    pub fn new(
        repository: Arc<Repository>,
        factory: Arc<A1ClientFactory>,
        notifier: Arc<dyn ServiceNotifier>,
    ) -> Self {
        Self {
            repository,
            factory,
            notifier,
        }
    }

    /// Run on a background task.
    pub fn spawn(&self, ric: Arc<Ric>) -> JoinHandle<SyncOutcome> {
        let task = self.clone();
        tokio::spawn(async move { task.run(&ric).await })
    }

    /// Synchronize `ric` and wait for the result.
    pub async fn run(&self, ric: &Ric) -> SyncOutcome {
        if !ric.begin_synchronization() {
            tracing::debug!(ric = %ric.name(), "synchronization already running");
            return SyncOutcome::AlreadyRunning;
        }
        let state = StateGuard::new(ric);
        let _lock = ric.lock().lock_exclusive().await;
        tracing::info!(ric = %ric.name(), "synchronization started");

        self.discard_transient_policies(ric);

        match self.synchronize(ric).await {
            Ok(()) => {
                state.complete();
                tracing::info!(ric = %ric.name(), "synchronization completed");
                SyncOutcome::Completed
            }
            Err(e) => {
                tracing::warn!(ric = %ric.name(), error = %e, "synchronization failed");
                ric.reset_protocol();
                state.fail();
                SyncOutcome::Failed(e)
            }
        }
    }

    async fn synchronize(&self, ric: &Ric) -> SyncResult<()> {
        let client = self
            .factory
            .create_client(ric)
            .await
            .map_err(SyncError::ClientCreation)?;

        self.delete_all_with_retry(ric, client.as_ref()).await?;
        self.synchronize_policy_types(ric, client.as_ref()).await?;
        self.recreate_policies(ric, client.as_ref()).await;
        self.notify_services(ric).await;
        Ok(())
    }

    fn discard_transient_policies(&self, ric: &Ric) {
        for policy in self.repository.policies.for_ric(ric.name()) {
            if policy.is_transient {
                tracing::debug!(ric = %ric.name(), policy = %policy.id, "discarding transient policy");
                self.repository.policies.remove(&policy.id);
            }
        }
    }

    async fn delete_all_with_retry(&self, ric: &Ric, client: &dyn A1Client) -> SyncResult<()> {
        match delete_all(client).await {
            Ok(count) => {
                tracing::debug!(ric = %ric.name(), count, "deleted all policies in ric");
                Ok(())
            }
            Err(first) => {
                tracing::debug!(ric = %ric.name(), error = %first, "delete all failed, retrying");
                delete_all(client).await.map(|_| ()).map_err(|e| {
                    tracing::warn!(ric = %ric.name(), error = %e, "could not delete all policies in ric");
                    SyncError::DeleteAll(e)
                })
            }
        }
    }

    async fn synchronize_policy_types(&self, ric: &Ric, client: &dyn A1Client) -> SyncResult<()> {
        let type_ids = client
            .get_policy_type_identities()
            .await
            .map_err(SyncError::PolicyTypes)?;

        let mut reported = Vec::with_capacity(type_ids.len());
        for type_id in type_ids {
            let policy_type = match self.repository.policy_types.find(&type_id) {
                Some(known) => known,
                None => {
                    let schema = client
                        .get_policy_type_schema(&type_id)
                        .await
                        .map_err(SyncError::PolicyTypes)?;
                    let created = PolicyType::new(type_id, schema);
                    self.repository.policy_types.put(created.clone());
                    created
                }
            };
            reported.push(policy_type);
        }

        tracing::debug!(ric = %ric.name(), count = reported.len(), "policy types synchronized");
        ric.replace_supported_types(reported);
        Ok(())
    }

    async fn recreate_policies(&self, ric: &Ric, client: &dyn A1Client) {
        for policy in self.repository.policies.for_ric(ric.name()) {
            if policy.is_transient {
                self.repository.policies.remove(&policy.id);
                continue;
            }
            if let Err(e) = client.put_policy(&policy).await {
                tracing::warn!(ric = %ric.name(), policy = %policy.id, error = %e, "could not recreate policy");
            }
        }
    }

    async fn notify_services(&self, ric: &Ric) {
        let message = synchronization_completed_message(ric.name());
        for service in self.repository.services.list() {
            if !service.has_callback() {
                continue;
            }
            if let Err(e) = self.notifier.notify(&service.callback_url, &message).await {
                tracing::warn!(
                    service = %service.name,
                    url = %service.callback_url,
                    error = %e,
                    "service notification failed"
                );
            }
        }
    }
}

impl SynchronizationTrigger for RicSynchronizationTask {
    fn trigger(&self, ric: Arc<Ric>) {
        drop(self.spawn(ric));
    }
}

/// Drain the delete-all stream; the first error fails the attempt.
async fn delete_all(client: &dyn A1Client) -> A1Result<usize> {
    client
        .delete_all_policies()
        .try_fold(0usize, |count, _| async move { Ok(count + 1) })
        .await
}

/// Leaves the ric `UNAVAILABLE` unless the run explicitly completes, so a
/// panicking or cancelled run never strands it in `SYNCHRONIZING`.
struct StateGuard<'a> {
    ric: &'a Ric,
    finished: bool,
}

impl<'a> StateGuard<'a> {
    fn new(ric: &'a Ric) -> Self {
        Self {
            ric,
            finished: false,
        }
    }

    fn complete(mut self) {
        self.finished = true;
        self.ric.complete_synchronization();
    }

    fn fail(mut self) {
        self.finished = true;
        self.ric.fail_synchronization();
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(ric = %self.ric.name(), "synchronization interrupted");
            self.ric.fail_synchronization();
        }
    }
}
