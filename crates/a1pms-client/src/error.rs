//! A1 client error types

use a1pms_core::ProtocolType;

/// Failures talking to a RIC or its controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum A1Error {
    /// Connection refused, timeout or other transport failure
    #[error("Request to {url} failed: {reason}")]
    Transport {
        /// Target URL
        url: String,
        /// Underlying cause
        reason: String,
    },

    /// The remote end answered with a non-success status
    #[error("Remote rejected request with status {status}: {body}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The body is not the JSON the dialect expects
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// What was wrong with it
        reason: String,
    },

    /// An expected key is missing from the response envelope
    #[error("Could not find '{key}' in response")]
    Parse {
        /// Missing key
        key: String,
    },

    /// The request body could not be encoded
    #[error("Could not encode request: {reason}")]
    InvalidRequest {
        /// Encoder message
        reason: String,
    },

    /// The dialect has no such operation
    #[error("{operation} is not implemented for {protocol}")]
    NotImplemented {
        /// Operation name
        operation: &'static str,
        /// Dialect
        protocol: ProtocolType,
    },

    /// Every candidate dialect probe failed
    #[error("Could not get protocol version from ric {ric}: {last}")]
    ProtocolDetectionFailed {
        /// Ric name
        ric: String,
        /// Error from the last probe
        last: Box<A1Error>,
    },

    /// No adapter exists for this dialect
    #[error("Not supported protocol type: {protocol}")]
    UnsupportedProtocol {
        /// Dialect
        protocol: ProtocolType,
    },

    /// A mediated dialect was requested for a ric without a controller
    #[error("Ric {ric} has no controller configured")]
    MissingController {
        /// Ric name
        ric: String,
    },

    /// The ric references a controller that is not configured
    #[error("Could not find controller: {name}")]
    ControllerNotFound {
        /// Controller name
        name: String,
    },
}

/// A1 client result type
pub type A1Result<T> = std::result::Result<T, A1Error>;

impl A1Error {
    /// Create a transport error
    pub fn transport(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(reason: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            reason: reason.to_string(),
        }
    }

    /// Create a missing key error
    pub fn parse(key: impl Into<String>) -> Self {
        Self::Parse { key: key.into() }
    }

    /// Create a not implemented error
    pub fn not_implemented(operation: &'static str, protocol: ProtocolType) -> Self {
        Self::NotImplemented {
            operation,
            protocol,
        }
    }

    /// Whether the dialect lacks the operation, as opposed to a failure.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}
