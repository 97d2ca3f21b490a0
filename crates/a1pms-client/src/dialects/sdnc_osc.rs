//! OSC form relayed through the SDNC A1 adapter.

use a1pms_core::{Policy, ProtocolType};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;

use super::ControllerEndpoint;
use crate::client::{delete_each, A1Client};
use crate::error::{A1Error, A1Result};
use crate::json::{
    extract_policy_schema, parse_string_array, require_output_value, validate_json_object, value_from_output,
};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
struct AdapterInput<'a> {
    near_rt_ric_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_type_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<&'a str>,
}

/// Adapter for `SDNC_OSC`. The RIC is addressed by its URL inside the
/// request envelope.
pub struct SdncOscA1Client {
    controller: ControllerEndpoint,
    ric_url: String,
}

impl SdncOscA1Client {
    pub(crate) fn new(ric_base_url: &str, controller: ControllerEndpoint) -> Self {
        Self {
            controller,
            ric_url: ric_base_url.to_string(),
        }
    }

    fn input(&self) -> AdapterInput<'_> {
        AdapterInput {
            near_rt_ric_url: &self.ric_url,
            ..AdapterInput::default()
        }
    }

    async fn delete_by_id(&self, policy_id: String) -> A1Result<String> {
        let input = AdapterInput {
            policy_id: Some(&policy_id),
            ..self.input()
        };
        self.controller.call("deletePolicy", &input).await
    }
}

#[async_trait]
impl A1Client for SdncOscA1Client {
    fn protocol(&self) -> ProtocolType {
        ProtocolType::SdncOsc
    }

    async fn get_policy_type_identities(&self) -> A1Result<Vec<String>> {
        let response = self
            .controller
            .call("getPolicyTypeIdentities", &self.input())
            .await?;
        parse_string_array(&value_from_output(&response, "policy-type-id-list")?)
    }

    async fn get_policy_identities(&self) -> A1Result<Vec<String>> {
        let response = self
            .controller
            .call("getPolicyIdentities", &self.input())
            .await?;
        parse_string_array(&value_from_output(&response, "policy-id-list")?)
    }

    async fn get_policy_type_schema(&self, policy_type_id: &str) -> A1Result<String> {
        let input = AdapterInput {
            policy_type_id: Some(policy_type_id),
            ..self.input()
        };
        let response = self.controller.call("getPolicyType", &input).await?;
        extract_policy_schema(&require_output_value(&response, "policy-type")?)
    }

    async fn put_policy(&self, policy: &Policy) -> A1Result<String> {
        let input = AdapterInput {
            policy_type_id: Some(&policy.policy_type),
            policy_id: Some(&policy.id),
            policy: Some(&policy.json),
            ..self.input()
        };
        let response = self.controller.call("putPolicy", &input).await?;
        validate_json_object(&value_from_output(&response, "returned-policy")?)
    }

    async fn delete_policy(&self, policy: &Policy) -> A1Result<String> {
        self.delete_by_id(policy.id.clone()).await
    }

    fn delete_all_policies(&self) -> BoxStream<'_, A1Result<String>> {
        delete_each(self.get_policy_identities(), move |id| self.delete_by_id(id))
    }

    async fn get_policy_status(&self, _policy: &Policy) -> A1Result<String> {
        Err(A1Error::not_implemented("get_policy_status", ProtocolType::SdncOsc))
    }

    async fn get_protocol_version(&self) -> A1Result<ProtocolType> {
        self.get_policy_type_identities().await?;
        Ok(ProtocolType::SdncOsc)
    }
}
