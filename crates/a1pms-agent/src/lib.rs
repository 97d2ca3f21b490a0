//! A1 policy management agent
//!
//! Loads the ric and controller configuration, wires the repository, the
//! adapter factory and the synchronization task together, and runs the
//! supervision loops until shutdown.
//!
//! # Usage
//!
//! ```rust,no_run
//! use a1pms_agent::{Agent, AgentConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AgentConfig::load("a1pms.toml").await?;
//! let agent = Agent::new(&config)?;
//! agent.apply_config(&config);
//! agent.start(Some("a1pms.toml".into()));
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod trigger;

pub use agent::Agent;
pub use config::{AgentConfig, HttpSection, SupervisionSection};
pub use trigger::TrackedTrigger;
