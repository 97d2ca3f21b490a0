//! RIC entity and its state machine.
//!
//! ```text
//!   UNAVAILABLE ──┐                 ┌──> AVAILABLE
//!                 ├─> SYNCHRONIZING ┤
//!   AVAILABLE ────┘                 └──> UNAVAILABLE
//! ```
//!
//! Only the synchronization task moves a ric between states. Entering
//! `SYNCHRONIZING` is an atomic check-and-set so two tasks can never run
//! for the same ric at once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::lock::Lock;
use crate::types::{PolicyType, ProtocolType, RicConfig};

/// Reconciliation state of a ric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RicState {
    /// Not reachable or not reconciled yet
    Unavailable,
    /// A synchronization task owns the ric
    Synchronizing,
    /// Reconciled and eligible for drift checks
    Available,
}

impl fmt::Display for RicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Unavailable => "UNAVAILABLE",
            Self::Synchronizing => "SYNCHRONIZING",
            Self::Available => "AVAILABLE",
        };
        f.write_str(tag)
    }
}

/// A near-RT RIC as seen by the control plane.
pub struct Ric {
    name: String,
    config: RwLock<RicConfig>,
    state: Mutex<RicState>,
    protocol: Mutex<ProtocolType>,
    supported_types: RwLock<BTreeMap<String, PolicyType>>,
    lock: Lock,
}

impl Ric {
    /// Create a ric in the `UNAVAILABLE` state.
    pub fn new(config: RicConfig) -> Self {
        let protocol = config.protocol.unwrap_or(ProtocolType::Unknown);
        Self {
            name: config.name.clone(),
            config: RwLock::new(config),
            state: Mutex::new(RicState::Unavailable),
            protocol: Mutex::new(protocol),
            supported_types: RwLock::new(BTreeMap::new()),
            lock: Lock::new(),
        }
    }

    /// Ric identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> RicConfig {
        self.config.read().clone()
    }

    /// Replace the configuration. The cached dialect is reset so the next
    /// synchronization probes the (possibly moved) endpoint again.
    pub fn set_config(&self, config: RicConfig) {
        let protocol = config.protocol.unwrap_or(ProtocolType::Unknown);
        *self.config.write() = config;
        *self.protocol.lock() = protocol;
    }

    /// Base URL of the RIC.
    pub fn base_url(&self) -> String {
        self.config.read().base_url.clone()
    }

    /// Name of the mediating controller, if any.
    pub fn controller(&self) -> Option<String> {
        self.config.read().controller.clone()
    }

    /// Managed element ids.
    pub fn managed_element_ids(&self) -> Vec<String> {
        self.config.read().managed_element_ids.clone()
    }

    /// Whether this ric controls the given managed element.
    pub fn is_managing(&self, managed_element_id: &str) -> bool {
        self.config
            .read()
            .managed_element_ids
            .iter()
            .any(|id| id == managed_element_id)
    }

    // -------------------------------------------------------------------------
    // State machine
    // -------------------------------------------------------------------------

    /// Current state.
    pub fn state(&self) -> RicState {
        *self.state.lock()
    }

    /// Enter `SYNCHRONIZING`. Returns false, leaving the state alone, when a
    /// synchronization is already in flight.
    pub fn begin_synchronization(&self) -> bool {
        let mut state = self.state.lock();
        if *state == RicState::Synchronizing {
            return false;
        }
        *state = RicState::Synchronizing;
        true
    }

    /// `SYNCHRONIZING -> AVAILABLE`.
    pub fn complete_synchronization(&self) {
        self.finish(RicState::Available);
    }

    /// `SYNCHRONIZING -> UNAVAILABLE`.
    pub fn fail_synchronization(&self) {
        self.finish(RicState::Unavailable);
    }

    fn finish(&self, next: RicState) {
        let mut state = self.state.lock();
        if *state != RicState::Synchronizing {
            tracing::warn!(ric = %self.name, from = %*state, to = %next, "unexpected state transition");
        }
        *state = next;
    }

    // -------------------------------------------------------------------------
    // Protocol dialect
    // -------------------------------------------------------------------------

    /// Cached dialect, `UNKNOWN` until probed.
    pub fn protocol(&self) -> ProtocolType {
        *self.protocol.lock()
    }

    /// Cache the dialect found by probing.
    pub fn set_protocol(&self, protocol: ProtocolType) {
        *self.protocol.lock() = protocol;
    }

    /// Forget a probed dialect so the next client creation probes again.
    /// A dialect pinned in the configuration is kept.
    pub fn reset_protocol(&self) {
        let pinned = self.config.read().protocol;
        *self.protocol.lock() = pinned.unwrap_or(ProtocolType::Unknown);
    }

    // -------------------------------------------------------------------------
    // Supported policy types
    // -------------------------------------------------------------------------

    /// Types last reported by the RIC.
    pub fn supported_types(&self) -> Vec<PolicyType> {
        self.supported_types.read().values().cloned().collect()
    }

    /// Names of the types last reported by the RIC.
    pub fn supported_type_names(&self) -> BTreeSet<String> {
        self.supported_types.read().keys().cloned().collect()
    }

    /// Whether the RIC reported this type.
    pub fn is_supporting_type(&self, name: &str) -> bool {
        self.supported_types.read().contains_key(name)
    }

    /// Replace the supported set with exactly what the RIC just reported.
    pub fn replace_supported_types(&self, types: impl IntoIterator<Item = PolicyType>) {
        let replacement = types.into_iter().map(|t| (t.name.clone(), t)).collect();
        *self.supported_types.write() = replacement;
    }

    /// The ric's shared/exclusive lock.
    pub fn lock(&self) -> &Lock {
        &self.lock
    }
}

impl fmt::Debug for Ric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ric")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("protocol", &self.protocol())
            .field("supported_types", &self.supported_type_names())
            .finish()
    }
}
