//! Repository error types
//!
//! Invariant violations rejected at the repository boundary.

/// Errors raised by the repositories when a request would break a
/// referential invariant or names something that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// No ric registered under this name
    #[error("Could not find ric: {name}")]
    RicNotFound {
        /// Requested ric name
        name: String,
    },

    /// No policy type registered under this name
    #[error("Could not find policy type: {name}")]
    PolicyTypeNotFound {
        /// Requested policy type name
        name: String,
    },

    /// No policy with this id
    #[error("Could not find policy: {id}")]
    PolicyNotFound {
        /// Requested policy id
        id: String,
    },

    /// No service registered under this name
    #[error("Could not find service: {name}")]
    ServiceNotFound {
        /// Requested service name
        name: String,
    },

    /// A ric still reports the type as supported
    #[error("Policy type {name} is still supported by ric {ric}")]
    PolicyTypeInUse {
        /// Policy type name
        name: String,
        /// First ric found supporting it
        ric: String,
    },

    /// The ric still owns policies and cannot be removed
    #[error("Ric {name} still owns {count} policies")]
    RicHasPolicies {
        /// Ric name
        name: String,
        /// Number of owned policies
        count: usize,
    },
}

/// Repository result type
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

impl RepositoryError {
    /// Create a ric-not-found error
    pub fn ric_not_found(name: impl Into<String>) -> Self {
        Self::RicNotFound { name: name.into() }
    }

    /// Create a policy-type-not-found error
    pub fn policy_type_not_found(name: impl Into<String>) -> Self {
        Self::PolicyTypeNotFound { name: name.into() }
    }

    /// Create a policy-not-found error
    pub fn policy_not_found(id: impl Into<String>) -> Self {
        Self::PolicyNotFound { id: id.into() }
    }

    /// Create a service-not-found error
    pub fn service_not_found(name: impl Into<String>) -> Self {
        Self::ServiceNotFound { name: name.into() }
    }
}
