//! Data model shared by every a1pms crate.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// =============================================================================
// Protocol dialects
// =============================================================================

/// Wire dialect spoken by a RIC, directly or through a mediating controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolType {
    /// Direct A1-P v1 with policy types
    #[serde(rename = "STD_V1")]
    StdV1,
    /// Direct A1-P v1 without policy types
    #[serde(rename = "STD_V1_1")]
    StdV1_1,
    /// OSC native `a1-p` API
    #[serde(rename = "OSC_V1")]
    OscV1,
    /// ONAP form relayed through an SDNC controller
    #[serde(rename = "SDNC_ONAP")]
    SdncOnap,
    /// OSC form relayed through an SDNC controller
    #[serde(rename = "SDNC_OSC")]
    SdncOsc,
    /// ONAP form relayed through an SDNR controller
    #[serde(rename = "SDNR_ONAP")]
    SdnrOnap,
    /// Not probed yet
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ProtocolType {
    /// True for dialects that are reached through a controller.
    pub fn is_mediated(self) -> bool {
        matches!(self, Self::SdncOnap | Self::SdncOsc | Self::SdnrOnap)
    }

    /// Stable upper-case tag used in logs and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StdV1 => "STD_V1",
            Self::StdV1_1 => "STD_V1_1",
            Self::OscV1 => "OSC_V1",
            Self::SdncOnap => "SDNC_ONAP",
            Self::SdncOsc => "SDNC_OSC",
            Self::SdnrOnap => "SDNR_ONAP",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Static description of one RIC as supplied by the configuration provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RicConfig {
    /// Unique ric name
    pub name: String,
    /// Base URL of the RIC's A1 endpoint
    pub base_url: String,
    /// Managed elements this RIC controls
    #[serde(default)]
    pub managed_element_ids: Vec<String>,
    /// Controller name, required for mediated dialects
    #[serde(default)]
    pub controller: Option<String>,
    /// Pre-seeded dialect; skips probing when set
    #[serde(default)]
    pub protocol: Option<ProtocolType>,
}

impl RicConfig {
    /// Config with no managed elements and no controller.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            managed_element_ids: Vec::new(),
            controller: None,
            protocol: None,
        }
    }

    /// Attach a controller reference.
    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Set the managed element ids.
    pub fn with_managed_elements<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.managed_element_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// A mediating SDNC/SDNR controller and its Basic auth credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Name referenced from [`RicConfig::controller`]
    pub name: String,
    /// Controller base URL
    pub base_url: String,
    /// Basic auth user
    pub username: String,
    /// Basic auth password
    pub password: String,
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Policies
// =============================================================================

/// A policy type and its JSON schema. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyType {
    /// Type identity
    pub name: String,
    /// JSON schema as raw text
    pub schema: String,
}

impl PolicyType {
    /// Create a policy type.
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
        }
    }
}

/// A policy instance owned by a service and placed in one RIC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Globally unique policy id
    pub id: String,
    /// Policy body as raw JSON text
    pub json: String,
    /// Owning service name
    pub owner_service: String,
    /// Ric holding the policy
    pub ric: String,
    /// Policy type name
    pub policy_type: String,
    /// Last modification time
    pub last_modified: DateTime<Utc>,
    /// Remote create/delete not yet confirmed
    pub is_transient: bool,
}

impl Policy {
    /// Create a confirmed policy stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        ric: impl Into<String>,
        policy_type: impl Into<String>,
        owner_service: impl Into<String>,
        json: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            json: json.into(),
            owner_service: owner_service.into(),
            ric: ric.into(),
            policy_type: policy_type.into(),
            last_modified: Utc::now(),
            is_transient: false,
        }
    }

    /// Mark the policy as not yet confirmed by the RIC.
    pub fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }
}

// =============================================================================
// Services
// =============================================================================

/// A policy consumer kept alive by heartbeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Service identity
    pub name: String,
    /// Zero means the service never expires
    pub keep_alive: Duration,
    /// Empty means the service is not notified
    pub callback_url: String,
    /// Time of the last heartbeat
    pub last_refresh: Instant,
}

impl Service {
    /// Create a service refreshed now.
    pub fn new(name: impl Into<String>, keep_alive: Duration, callback_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keep_alive,
            callback_url: callback_url.into(),
            last_refresh: Instant::now(),
        }
    }

    /// Record a heartbeat.
    pub fn refresh(&mut self) {
        self.last_refresh = Instant::now();
    }

    /// True when the keep-alive is non-zero and has elapsed at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        !self.keep_alive.is_zero() && now.saturating_duration_since(self.last_refresh) > self.keep_alive
    }

    /// Whether synchronization notifications should be sent.
    pub fn has_callback(&self) -> bool {
        !self.callback_url.is_empty()
    }
}
