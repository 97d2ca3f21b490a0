//! A1 policy synchronization and supervision
//!
//! Keeps every near-RT RIC consistent with the repository.
//!
//! # Architecture
//!
//! - [`RicSynchronizationTask`]: reconciles one RIC, under its exclusive lock
//! - [`RicSupervision`]: detects drift and triggers synchronization
//! - [`ServiceSupervision`]: expires services and cascades to their policies
//! - [`RicConfigRefresh`]: reacts to ric configuration changes
//! - [`TaskRegistry`]: runs the loops until shutdown
//!
//! Failures never cross rics: every RIC is synchronized and supervised
//! independently of the others.

pub mod config;
pub mod config_refresh;
pub mod error;
pub mod notifier;
pub mod ric_supervision;
pub mod service_supervision;
pub mod synchronization;
pub mod task_registry;

pub use config::SupervisionConfig;
pub use config_refresh::{diff_ric_configs, RemovalMode, RicConfigRefresh, RicConfigUpdate};
pub use error::{SyncError, SyncResult};
pub use notifier::{synchronization_completed_message, HttpNotifier, ServiceNotifier};
pub use ric_supervision::{DriftReason, RicSupervision, RicVerdict, SkipReason, SupervisionReport};
pub use service_supervision::ServiceSupervision;
pub use synchronization::{RicSynchronizationTask, SyncOutcome, SynchronizationTrigger};
pub use task_registry::TaskRegistry;
