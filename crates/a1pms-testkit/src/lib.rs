//! A1 policy management testing infrastructure
//!
//! In-memory stand-ins for every seam the control plane talks through:
//!
//! - [`MockRic`] / [`MockClientBuilder`]: a scriptable RIC and the adapter
//!   builder the factory uses to reach it
//! - [`MockRestClient`]: scripted HTTP responses for exercising real dialects
//! - [`RecordingNotifier`] / [`RecordingTrigger`]: capture side effects
//! - [`fixtures`]: rics, policies and repositories for tests
//!
//! ```rust,no_run
//! use a1pms_testkit::*;
//!
//! # async fn example() {
//! let builder = MockClientBuilder::new();
//! builder.ric("ric1").add_policy_type("t1", "{}");
//! let factory = builder.factory();
//! # }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

pub mod fixtures;
pub mod mock_ric;
pub mod notifier;
pub mod rest;
pub mod trigger;

pub use fixtures::*;
pub use mock_ric::{MockA1Client, MockCall, MockClientBuilder, MockRic};
pub use notifier::RecordingNotifier;
pub use rest::{MockRestClient, RestCall};
pub use trigger::RecordingTrigger;
