//! ONAP form relayed through an SDNC or SDNR A1 adapter.
//!
//! Both controllers expose the same RPCs; only the dialect tag differs.

use a1pms_core::{Policy, ProtocolType};
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::stream::BoxStream;
use serde::Serialize;

use super::ControllerEndpoint;
use crate::client::{delete_each, delete_per_type, A1Client};
use crate::error::{A1Error, A1Result};
use crate::json::{extract_policy_schema, parse_string_array, require_output_value, value_from_output};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
struct AdapterInput<'a> {
    near_rt_ric_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_type_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_instance_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_instance: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<String>>,
}

/// Adapter for `SDNC_ONAP` and `SDNR_ONAP`.
pub struct OnapControllerClient {
    protocol: ProtocolType,
    controller: ControllerEndpoint,
    ric_id: String,
}

impl OnapControllerClient {
    pub(crate) fn sdnc(ric_base_url: &str, controller: ControllerEndpoint) -> Self {
        Self::new(ProtocolType::SdncOnap, ric_base_url, controller)
    }

    pub(crate) fn sdnr(ric_base_url: &str, controller: ControllerEndpoint) -> Self {
        Self::new(ProtocolType::SdnrOnap, ric_base_url, controller)
    }

    fn new(protocol: ProtocolType, ric_base_url: &str, controller: ControllerEndpoint) -> Self {
        Self {
            protocol,
            controller,
            ric_id: ric_base_url.to_string(),
        }
    }

    fn input(&self) -> AdapterInput<'_> {
        AdapterInput {
            near_rt_ric_id: &self.ric_id,
            ..AdapterInput::default()
        }
    }

    async fn policy_ids_for_type(&self, type_id: String) -> A1Result<Vec<String>> {
        let input = AdapterInput {
            policy_type_id: Some(&type_id),
            ..self.input()
        };
        let response = self.controller.call("getPolicyInstances", &input).await?;
        parse_string_array(&value_from_output(&response, "policy-instance-id-list")?)
    }

    async fn delete_by_ids(&self, type_id: String, policy_id: String) -> A1Result<String> {
        let input = AdapterInput {
            policy_type_id: Some(&type_id),
            policy_instance_id: Some(&policy_id),
            ..self.input()
        };
        self.controller.call("deletePolicyInstance", &input).await
    }

    fn delete_policies_for_type(&self, type_id: String) -> BoxStream<'_, A1Result<String>> {
        let ids = self.policy_ids_for_type(type_id.clone());
        delete_each(ids, move |policy_id| self.delete_by_ids(type_id.clone(), policy_id))
    }
}

#[async_trait]
impl A1Client for OnapControllerClient {
    fn protocol(&self) -> ProtocolType {
        self.protocol
    }

    async fn get_policy_type_identities(&self) -> A1Result<Vec<String>> {
        let response = self.controller.call("getPolicyTypes", &self.input()).await?;
        parse_string_array(&value_from_output(&response, "policy-type-id-list")?)
    }

    async fn get_policy_identities(&self) -> A1Result<Vec<String>> {
        let types = self.get_policy_type_identities().await?;
        let per_type = try_join_all(types.into_iter().map(|t| self.policy_ids_for_type(t))).await?;
        Ok(per_type.into_iter().flatten().collect())
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
            policy_instance_id: Some(&policy.id),
            policy_instance: Some(&policy.json),
            properties: Some(Vec::new()),
            ..self.input()
        };
        self.controller.call("createPolicyInstance", &input).await
    }

    async fn delete_policy(&self, policy: &Policy) -> A1Result<String> {
        self.delete_by_ids(policy.policy_type.clone(), policy.id.clone())
            .await
    }

    fn delete_all_policies(&self) -> BoxStream<'_, A1Result<String>> {
        delete_per_type(self.get_policy_type_identities(), move |type_id| {
            self.delete_policies_for_type(type_id)
        })
    }

    async fn get_policy_status(&self, _policy: &Policy) -> A1Result<String> {
        Err(A1Error::not_implemented("get_policy_status", self.protocol))
    }

    async fn get_protocol_version(&self) -> A1Result<ProtocolType> {
        self.get_policy_type_identities().await?;
        Ok(self.protocol)
    }
}
