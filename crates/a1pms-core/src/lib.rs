//! A1 policy management core
//!
//! Holds the desired and observed policy state for a fleet of near-RT RICs:
//!
//! - [`types`]: policies, policy types, services and ric configuration
//! - [`Lock`]: the per-RIC shared/exclusive lock with outstanding-count introspection
//! - [`Ric`]: a RIC entity with its state machine and cached protocol dialect
//! - [`Repository`]: the four internally synchronized registries
//!
//! Nothing in this crate performs I/O. Talking to RICs lives in `a1pms-client`
//! and the reconciliation machinery in `a1pms-sync`.

#![deny(missing_docs)]

pub mod error;
pub mod lock;
pub mod repository;
pub mod ric;
pub mod types;

pub use error::{RepositoryError, RepositoryResult};
pub use lock::{Lock, LockGuard, LockKind};
pub use repository::{Policies, PolicyTypes, Repository, Rics, Services};
pub use ric::{Ric, RicState};
pub use types::{ControllerConfig, Policy, PolicyType, ProtocolType, RicConfig, Service};
