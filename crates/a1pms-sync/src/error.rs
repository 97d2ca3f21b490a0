//! Synchronization error types

use a1pms_client::A1Error;

/// Why a synchronization run left the ric `UNAVAILABLE`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// No adapter could be created, usually because no dialect answered
    #[error("Could not create A1 client: {0}")]
    ClientCreation(#[source] A1Error),

    /// Clearing the RIC failed on the first attempt and on the retry
    #[error("Could not delete all policies: {0}")]
    DeleteAll(#[source] A1Error),

    /// Listing types or fetching a schema failed
    #[error("Could not synchronize policy types: {0}")]
    PolicyTypes(#[source] A1Error),
}

/// Synchronization result type
pub type SyncResult<T> = std::result::Result<T, SyncError>;
