//! OSC native `a1-p` API.
//!
//! Policies are nested under their type, so listing and bulk deletion fan
//! out over the type catalogue.

use std::sync::Arc;

use a1pms_core::{Policy, ProtocolType};
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::client::{delete_each, delete_per_type, join_url, A1Client};
use crate::error::{A1Error, A1Result};
use crate::json::{parse_object, parse_string_array};
use crate::rest::RestClient;

const CREATE_SCHEMA: &str = "create_schema";

/// Adapter for `OSC_V1`, rooted at `{ric}/a1-p`.
pub struct OscA1Client {
    rest: Arc<dyn RestClient>,
    base_url: String,
}

impl OscA1Client {
    /// Adapter for the RIC at `ric_base_url`.
    pub fn new(ric_base_url: &str, rest: Arc<dyn RestClient>) -> Self {
        tracing::debug!(ric_base_url, "creating OSC A1 client");
        Self {
            rest,
            base_url: join_url(ric_base_url, "/a1-p"),
        }
    }

    fn type_url(&self, type_id: &str) -> String {
        format!("{}/policytypes/{}", self.base_url, type_id)
    }

    fn policy_url(&self, type_id: &str, policy_id: &str) -> String {
        format!("{}/policies/{}", self.type_url(type_id), policy_id)
    }

    async fn policy_ids_for_type(&self, type_id: String) -> A1Result<Vec<String>> {
        let body = self
            .rest
            .get(&format!("{}/policies", self.type_url(&type_id)))
            .await?;
        parse_string_array(&body)
    }

    async fn delete_by_ids(&self, type_id: String, policy_id: String) -> A1Result<String> {
        self.rest.delete(&self.policy_url(&type_id, &policy_id)).await
    }

    fn delete_policies_for_type(&self, type_id: String) -> BoxStream<'_, A1Result<String>> {
        let ids = self.policy_ids_for_type(type_id.clone());
        delete_each(ids, move |policy_id| self.delete_by_ids(type_id.clone(), policy_id))
    }
}

#[async_trait]
impl A1Client for OscA1Client {
    fn protocol(&self) -> ProtocolType {
        ProtocolType::OscV1
    }

    async fn get_policy_type_identities(&self) -> A1Result<Vec<String>> {
        let body = self.rest.get(&format!("{}/policytypes", self.base_url)).await?;
        parse_string_array(&body)
    }

    async fn get_policy_identities(&self) -> A1Result<Vec<String>> {
        let types = self.get_policy_type_identities().await?;
        let per_type = try_join_all(types.into_iter().map(|t| self.policy_ids_for_type(t))).await?;
        Ok(per_type.into_iter().flatten().collect())
    }

    /// The type document carries the schema under `create_schema`; the type
    /// id is written into the schema's `title`.
    async fn get_policy_type_schema(&self, policy_type_id: &str) -> A1Result<String> {
        let body = self.rest.get(&self.type_url(policy_type_id)).await?;
        let mut document = parse_object(&body)?;
        let Some(Value::Object(mut schema)) = document.remove(CREATE_SCHEMA) else {
            tracing::warn!(policy_type = policy_type_id, response = %body, "unexpected response for policy type");
            return Err(A1Error::parse(CREATE_SCHEMA));
        };
        schema.insert("title".to_string(), Value::String(policy_type_id.to_string()));
        Ok(Value::Object(schema).to_string())
    }

    async fn put_policy(&self, policy: &Policy) -> A1Result<String> {
        self.rest
            .put(&self.policy_url(&policy.policy_type, &policy.id), &policy.json)
            .await
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

    async fn get_policy_status(&self, policy: &Policy) -> A1Result<String> {
        self.rest
            .get(&format!("{}/status", self.policy_url(&policy.policy_type, &policy.id)))
            .await
    }

    async fn get_protocol_version(&self) -> A1Result<ProtocolType> {
        self.rest
            .get(&format!("{}/healthcheck", self.base_url))
            .await?;
        Ok(ProtocolType::OscV1)
    }
}
