//! One adapter per A1 dialect
//!
//! | dialect | transport | policy addressing |
//! |---|---|---|
//! | `STD_V1` | `{ric}/A1-P/v1` | flat `/policies/{id}`, real types |
//! | `STD_V1_1` | `{ric}/A1-P/v1` | flat `/policies/{id}`, no types |
//! | `OSC_V1` | `{ric}/a1-p` | `/policytypes/{type}/policies/{id}` |
//! | `SDNC_OSC` | controller RPC | ric URL inside the envelope |
//! | `SDNC_ONAP`, `SDNR_ONAP` | controller RPC | ric id inside the envelope, per-type instances |

mod onap;
mod osc;
mod sdnc_osc;
mod std_v1;
mod std_v1_1;

pub use onap::OnapControllerClient;
pub use osc::OscA1Client;
pub use sdnc_osc::SdncOscA1Client;
pub use std_v1::StdA1Client;
pub use std_v1_1::StdA1ClientV1_1;

use std::sync::Arc;

use a1pms_core::ControllerConfig;
use serde::Serialize;

use crate::error::A1Result;
use crate::json::input_envelope;
use crate::rest::RestClient;

const OPERATIONS_PATH: &str = "/restconf/operations/A1-ADAPTER-API:";

/// RPC endpoint of a mediating controller.
#[derive(Clone)]
pub(crate) struct ControllerEndpoint {
    rest: Arc<dyn RestClient>,
    operations_url: String,
    username: String,
    password: String,
}

impl ControllerEndpoint {
    pub(crate) fn new(controller: &ControllerConfig, rest: Arc<dyn RestClient>) -> Self {
        Self {
            rest,
            operations_url: crate::client::join_url(&controller.base_url, OPERATIONS_PATH),
            username: controller.username.clone(),
            password: controller.password.clone(),
        }
    }

    /// POST `{"input": fields}` to an A1 adapter operation.
    pub(crate) async fn call<T: Serialize + Sync>(&self, operation: &str, fields: &T) -> A1Result<String> {
        let body = input_envelope(fields)?;
        let url = format!("{}{}", self.operations_url, operation);
        tracing::debug!(%url, input = %body, "controller request");
        self.rest
            .post_with_auth(&url, &body, &self.username, &self.password)
            .await
    }
}
