//! The uniform A1 operation set.

use std::fmt;
use std::future::Future;

use a1pms_core::{Policy, ProtocolType};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::error::A1Result;

/// Operations every dialect supports, so callers never need to know which
/// wire protocol a RIC speaks.
#[async_trait]
pub trait A1Client: Send + Sync {
    /// Dialect implemented by this adapter.
    fn protocol(&self) -> ProtocolType;

    /// Ids of the policy types the RIC supports. Dialects without types
    /// return a single empty-string placeholder.
    async fn get_policy_type_identities(&self) -> A1Result<Vec<String>>;

    /// Ids of every policy in the RIC.
    async fn get_policy_identities(&self) -> A1Result<Vec<String>>;

    /// JSON schema of a policy type.
    async fn get_policy_type_schema(&self, policy_type_id: &str) -> A1Result<String>;

    /// Create or replace a policy; returns the dialect's acknowledgement.
    async fn put_policy(&self, policy: &Policy) -> A1Result<String>;

    /// Delete one policy.
    async fn delete_policy(&self, policy: &Policy) -> A1Result<String>;

    /// Delete every policy the RIC knows about. Each item is the response
    /// to one delete; a failed delete surfaces as an error item.
    fn delete_all_policies(&self) -> BoxStream<'_, A1Result<String>>;

    /// Status document of a policy.
    async fn get_policy_status(&self, policy: &Policy) -> A1Result<String>;

    /// Cheap probe confirming the RIC speaks this dialect.
    async fn get_protocol_version(&self) -> A1Result<ProtocolType>;
}

impl fmt::Debug for dyn A1Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A1Client")
            .field("protocol", &self.protocol())
            .finish()
    }
}

/// Resolve a list of ids, then run `delete` on each in turn.
pub(crate) fn delete_each<'a, Ids, F, Fut>(ids: Ids, delete: F) -> BoxStream<'a, A1Result<String>>
where
    Ids: Future<Output = A1Result<Vec<String>>> + Send + 'a,
    F: FnMut(String) -> Fut + Send + 'a,
    Fut: Future<Output = A1Result<String>> + Send + 'a,
{
    stream::once(ids)
        .map_ok(|ids| stream::iter(ids.into_iter().map(Ok)))
        .try_flatten()
        .and_then(delete)
        .boxed()
}

/// Resolve the type ids, then chain the per-type delete streams.
pub(crate) fn delete_per_type<'a, Types, F>(types: Types, per_type: F) -> BoxStream<'a, A1Result<String>>
where
    Types: Future<Output = A1Result<Vec<String>>> + Send + 'a,
    F: FnMut(String) -> BoxStream<'a, A1Result<String>> + Send + 'a,
{
    stream::once(types)
        .map_ok(|types| stream::iter(types.into_iter().map(Ok)))
        .try_flatten()
        .map_ok(per_type)
        .try_flatten()
        .boxed()
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
