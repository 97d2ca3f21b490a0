//! Direct A1-P v1 with policy types.

use std::sync::Arc;

use a1pms_core::{Policy, ProtocolType};
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::client::{delete_each, join_url, A1Client};
use crate::error::A1Result;
use crate::json::{extract_policy_schema, parse_string_array, validate_json_object};
use crate::rest::RestClient;

/// Adapter for `STD_V1`, rooted at `{ric}/A1-P/v1`.
pub struct StdA1Client {
    rest: Arc<dyn RestClient>,
    base_url: String,
}

impl StdA1Client {
    /// Adapter for the RIC at `ric_base_url`.
    pub fn new(ric_base_url: &str, rest: Arc<dyn RestClient>) -> Self {
        Self {
            rest,
            base_url: join_url(ric_base_url, "/A1-P/v1"),
        }
    }

    fn policy_url(&self, policy_id: &str) -> String {
        format!("{}/policies/{}", self.base_url, policy_id)
    }

    async fn delete_by_id(&self, policy_id: String) -> A1Result<String> {
        self.rest.delete(&self.policy_url(&policy_id)).await
    }
}

#[async_trait]
impl A1Client for StdA1Client {
    fn protocol(&self) -> ProtocolType {
        ProtocolType::StdV1
    }

    async fn get_policy_type_identities(&self) -> A1Result<Vec<String>> {
        let body = self.rest.get(&format!("{}/policytypes", self.base_url)).await?;
        parse_string_array(&body)
    }

    async fn get_policy_identities(&self) -> A1Result<Vec<String>> {
        let body = self.rest.get(&format!("{}/policies", self.base_url)).await?;
        parse_string_array(&body)
    }

    async fn get_policy_type_schema(&self, policy_type_id: &str) -> A1Result<String> {
        let body = self
            .rest
            .get(&format!("{}/policytypes/{}", self.base_url, policy_type_id))
            .await?;
        extract_policy_schema(&body)
    }

    async fn put_policy(&self, policy: &Policy) -> A1Result<String> {
        let url = format!("{}?policyTypeId={}", self.policy_url(&policy.id), policy.policy_type);
        let body = self.rest.put(&url, &policy.json).await?;
        validate_json_object(&body)
    }

    async fn delete_policy(&self, policy: &Policy) -> A1Result<String> {
        self.delete_by_id(policy.id.clone()).await
    }

    fn delete_all_policies(&self) -> BoxStream<'_, A1Result<String>> {
        delete_each(self.get_policy_identities(), move |id| self.delete_by_id(id))
    }

    async fn get_policy_status(&self, policy: &Policy) -> A1Result<String> {
        self.rest
            .get(&format!("{}/status", self.policy_url(&policy.id)))
            .await
    }

    async fn get_protocol_version(&self) -> A1Result<ProtocolType> {
        self.get_policy_type_identities().await?;
        Ok(ProtocolType::StdV1)
    }
}
