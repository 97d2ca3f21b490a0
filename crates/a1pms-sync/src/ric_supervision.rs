//! Drift detection over all rics
//!
//! Compares what every `AVAILABLE` RIC reports against the repository and
//! triggers a synchronization on any difference. `UNAVAILABLE` rics are
//! resynchronized without comparison and `SYNCHRONIZING` ones are left alone.
//! A failed fetch is treated as a transient glitch: nothing is triggered.

use std::collections::BTreeSet;
use std::sync::Arc;

use a1pms_client::{A1ClientFactory, A1Result};
use a1pms_core::{Repository, Ric, RicState};
use futures::future::join_all;

use crate::synchronization::SynchronizationTrigger;

/// What one pass decided for one ric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RicVerdict {
    /// Reported state matches the repository
    Consistent,
    /// A synchronization was triggered
    Resynchronize(DriftReason),
    /// Nothing was checked
    Skipped(SkipReason),
}

/// Why a ric was resynchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftReason {
    /// The ric was `UNAVAILABLE`
    Unavailable,
    /// Policy ids differ
    Policies,
    /// Policy type ids differ
    PolicyTypes,
}

/// Why a ric was not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A synchronization is in flight
    Synchronizing,
    /// The RIC could not be queried this time
    FetchFailed(String),
}

/// Result of one pass.
#[derive(Debug, Default, Clone)]
pub struct SupervisionReport {
    /// Verdict per ric name
    pub verdicts: Vec<(String, RicVerdict)>,
}

impl SupervisionReport {
    /// Names of the rics a synchronization was triggered for.
    pub fn triggered(&self) -> Vec<&str> {
        self.verdicts
            .iter()
            .filter(|(_, verdict)| matches!(verdict, RicVerdict::Resynchronize(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Periodic drift detector for rics.
pub struct RicSupervision {
    repository: Arc<Repository>,
    factory: Arc<A1ClientFactory>,
    trigger: Arc<dyn SynchronizationTrigger>,
}

impl RicSupervision {
    /// Create the detector.
    pub fn new(
        repository: Arc<Repository>,
        factory: Arc<A1ClientFactory>,
        trigger: Arc<dyn SynchronizationTrigger>,
    ) -> Self {
        Self {
            repository,
            factory,
            trigger,
        }
    }

    /// Check every ric once. Rics are checked concurrently and independently.
    pub async fn check_all_rics(&self) -> SupervisionReport {
        let rics = self.repository.rics.list();
        let verdicts = join_all(rics.into_iter().map(|ric| async move {
            let verdict = self.check_ric(&ric).await;
            if matches!(verdict, RicVerdict::Resynchronize(_)) {
                tracing::info!(ric = %ric.name(), verdict = ?verdict, "starting synchronization");
                self.trigger.trigger(ric.clone());
            }
            (ric.name().to_string(), verdict)
        }))
        .await;
        SupervisionReport { verdicts }
    }

    async fn check_ric(&self, ric: &Ric) -> RicVerdict {
        match ric.state() {
            RicState::Synchronizing => RicVerdict::Skipped(SkipReason::Synchronizing),
            RicState::Unavailable => RicVerdict::Resynchronize(DriftReason::Unavailable),
            RicState::Available => match self.compare(ric).await {
                Ok(None) => RicVerdict::Consistent,
                Ok(Some(reason)) => RicVerdict::Resynchronize(reason),
                Err(e) => {
                    tracing::debug!(ric = %ric.name(), error = %e, "ric supervision skipped");
                    ric.reset_protocol();
                    RicVerdict::Skipped(SkipReason::FetchFailed(e.to_string()))
                }
            },
        }
    }

    async fn compare(&self, ric: &Ric) -> A1Result<Option<DriftReason>> {
        let _lock = ric.lock().lock_shared().await;
        let client = self.factory.create_client(ric).await?;

        let reported_policies: BTreeSet<String> = client.get_policy_identities().await?.into_iter().collect();
        if reported_policies != self.repository.policies.ids_for_ric(ric.name()) {
            return Ok(Some(DriftReason::Policies));
        }

        let reported_types: BTreeSet<String> = client.get_policy_type_identities().await?.into_iter().collect();
        if reported_types != ric.supported_type_names() {
            return Ok(Some(DriftReason::PolicyTypes));
        }

        Ok(None)
    }
}
