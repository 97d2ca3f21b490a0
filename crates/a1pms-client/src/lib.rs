//! A1 protocol adapters
//!
//! Lets the rest of the control plane talk to a near-RT RIC without knowing
//! which A1 dialect it speaks.
//!
//! # Architecture
//!
//! - [`A1Client`]: the uniform operation set
//! - [`dialects`]: one adapter per wire dialect
//! - [`RestClient`]: the HTTP seam every adapter goes through
//! - [`A1ClientFactory`]: probes a ric's dialect once and caches it on the ric
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a1pms_client::{A1ClientFactory, HttpClientBuilder, HttpRestClient, DEFAULT_TIMEOUT};
//! use a1pms_core::{Ric, RicConfig};
//!
//! # async fn run() -> a1pms_client::A1Result<()> {
//! let rest = Arc::new(HttpRestClient::new(DEFAULT_TIMEOUT)?);
//! let factory = A1ClientFactory::new(Arc::new(HttpClientBuilder::new(rest)));
//! let ric = Ric::new(RicConfig::new("ric1", "http://ric1:8085"));
//!
//! let client = factory.create_client(&ric).await?;
//! let types = client.get_policy_type_identities().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod dialects;
pub mod error;
pub mod factory;
pub mod json;
pub mod rest;

pub use client::A1Client;
pub use error::{A1Error, A1Result};
pub use factory::{A1ClientFactory, ClientBuilder, HttpClientBuilder, DEFAULT_PROBE_ORDER};
pub use rest::{HttpRestClient, RestClient, DEFAULT_TIMEOUT};
