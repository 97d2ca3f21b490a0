//! A scriptable in-memory RIC.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use a1pms_client::{A1Client, A1ClientFactory, A1Error, A1Result, ClientBuilder};
use a1pms_core::{Policy, ProtocolType, Ric};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;

/// One operation received by a [`MockRic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Probe(ProtocolType),
    ListTypes,
    ListPolicies,
    GetSchema(String),
    Put(String),
    Delete(String),
    DeleteAll,
    Status(String),
}

#[derive(Debug)]
struct MockRicState {
    speaks: ProtocolType,
    reachable: bool,
    policy_types: BTreeMap<String, String>,
    policies: BTreeMap<String, Policy>,
    delete_all_failures: usize,
    fail_type_listing: bool,
    fail_policy_listing: bool,
    fail_puts: BTreeSet<String>,
    fail_deletes: BTreeSet<String>,
    calls: Vec<MockCall>,
}

/// RIC state shared by every adapter built for it.
#[derive(Debug)]
pub struct MockRic {
    name: String,
    state: Mutex<MockRicState>,
}

impl MockRic {
    pub fn new(name: impl Into<String>, speaks: ProtocolType) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            state: Mutex::new(MockRicState {
                speaks,
                reachable: true,
                policy_types: BTreeMap::new(),
                policies: BTreeMap::new(),
                delete_all_failures: 0,
                fail_type_listing: false,
                fail_policy_listing: false,
                fail_puts: BTreeSet::new(),
                fail_deletes: BTreeSet::new(),
                calls: Vec::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ---- scripting ----

    pub fn set_speaks(&self, protocol: ProtocolType) {
        self.state.lock().speaks = protocol;
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    pub fn add_policy_type(&self, name: &str, schema: &str) -> &Self {
        self.state
            .lock()
            .policy_types
            .insert(name.to_string(), schema.to_string());
        self
    }

    pub fn remove_policy_type(&self, name: &str) {
        self.state.lock().policy_types.remove(name);
    }

    /// Place a policy directly in the RIC, bypassing the repository.
    pub fn add_remote_policy(&self, policy: Policy) {
        self.state.lock().policies.insert(policy.id.clone(), policy);
    }

    pub fn remove_remote_policy(&self, id: &str) {
        self.state.lock().policies.remove(id);
    }

    /// The next `times` delete-all attempts fail.
    pub fn fail_delete_all(&self, times: usize) {
        self.state.lock().delete_all_failures = times;
    }

    pub fn fail_type_listing(&self, fail: bool) {
        self.state.lock().fail_type_listing = fail;
    }

    pub fn fail_policy_listing(&self, fail: bool) {
        self.state.lock().fail_policy_listing = fail;
    }

    pub fn fail_put(&self, policy_id: &str) {
        self.state.lock().fail_puts.insert(policy_id.to_string());
    }

    pub fn fail_delete(&self, policy_id: &str) {
        self.state.lock().fail_deletes.insert(policy_id.to_string());
    }

    // ---- inspection ----

    pub fn remote_policy_ids(&self) -> BTreeSet<String> {
        self.state.lock().policies.keys().cloned().collect()
    }

    pub fn remote_type_ids(&self) -> BTreeSet<String> {
        self.state.lock().policy_types.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn probes(&self) -> Vec<ProtocolType> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Probe(protocol) => Some(protocol),
                _ => None,
            })
            .collect()
    }

    pub fn puts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Put(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &MockCall) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn unreachable(&self) -> A1Error {
        A1Error::transport(format!("mock://{}", self.name), "connection refused")
    }

    /// Record `call` and fail if the RIC is down.
    fn enter(&self, call: MockCall) -> A1Result<parking_lot::MutexGuard<'_, MockRicState>> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.reachable {
            Ok(state)
        } else {
            Err(self.unreachable())
        }
    }
}

/// Adapter over a [`MockRic`] for one dialect.
pub struct MockA1Client {
    protocol: ProtocolType,
    ric: Arc<MockRic>,
}

impl MockA1Client {
    pub fn new(protocol: ProtocolType, ric: Arc<MockRic>) -> Self {
        Self { protocol, ric }
    }
}

#[async_trait]
impl A1Client for MockA1Client {
    fn protocol(&self) -> ProtocolType {
        self.protocol
    }

    async fn get_policy_type_identities(&self) -> A1Result<Vec<String>> {
        let state = self.ric.enter(MockCall::ListTypes)?;
        if state.fail_type_listing {
            return Err(self.ric.unreachable());
        }
        Ok(state.policy_types.keys().cloned().collect())
    }

    async fn get_policy_identities(&self) -> A1Result<Vec<String>> {
        let state = self.ric.enter(MockCall::ListPolicies)?;
        if state.fail_policy_listing {
            return Err(self.ric.unreachable());
        }
        Ok(state.policies.keys().cloned().collect())
    }

    async fn get_policy_type_schema(&self, policy_type_id: &str) -> A1Result<String> {
        let state = self.ric.enter(MockCall::GetSchema(policy_type_id.to_string()))?;
        state
            .policy_types
            .get(policy_type_id)
            .cloned()
            .ok_or_else(|| A1Error::RemoteRejected {
                status: 404,
                body: format!("no policy type {policy_type_id}"),
            })
    }

    async fn put_policy(&self, policy: &Policy) -> A1Result<String> {
        let mut state = self.ric.enter(MockCall::Put(policy.id.clone()))?;
        if state.fail_puts.contains(&policy.id) {
            return Err(A1Error::RemoteRejected {
                status: 400,
                body: "rejected".to_string(),
            });
        }
        state.policies.insert(policy.id.clone(), policy.clone());
        Ok(policy.json.clone())
    }

    async fn delete_policy(&self, policy: &Policy) -> A1Result<String> {
        let mut state = self.ric.enter(MockCall::Delete(policy.id.clone()))?;
        if state.fail_deletes.contains(&policy.id) {
            return Err(A1Error::RemoteRejected {
                status: 500,
                body: "delete failed".to_string(),
            });
        }
        state.policies.remove(&policy.id);
        Ok(String::new())
    }

    fn delete_all_policies(&self) -> BoxStream<'_, A1Result<String>> {
        let results = match self.ric.enter(MockCall::DeleteAll) {
            Err(e) => vec![Err(e)],
            Ok(mut state) if state.delete_all_failures > 0 => {
                state.delete_all_failures -= 1;
                vec![Err(self.ric.unreachable())]
            }
            Ok(mut state) => {
                let ids: Vec<String> = state.policies.keys().cloned().collect();
                ids.into_iter()
                    .map(|id| {
                        if state.fail_deletes.contains(&id) {
                            Err(A1Error::RemoteRejected {
                                status: 500,
                                body: format!("could not delete {id}"),
                            })
                        } else {
                            state.policies.remove(&id);
                            Ok(id)
                        }
                    })
                    .collect()
            }
        };
        stream::iter(results).boxed()
    }

    async fn get_policy_status(&self, policy: &Policy) -> A1Result<String> {
        let state = self.ric.enter(MockCall::Status(policy.id.clone()))?;
        if state.policies.contains_key(&policy.id) {
            Ok("{\"enforceStatus\":\"ENFORCED\"}".to_string())
        } else {
            Err(A1Error::RemoteRejected {
                status: 404,
                body: String::new(),
            })
        }
    }

    async fn get_protocol_version(&self) -> A1Result<ProtocolType> {
        let state = self.ric.enter(MockCall::Probe(self.protocol))?;
        if state.speaks == self.protocol {
            Ok(self.protocol)
        } else {
            Err(A1Error::RemoteRejected {
                status: 404,
                body: format!("{} does not speak {}", self.ric.name, self.protocol),
            })
        }
    }
}

/// [`ClientBuilder`] handing out [`MockA1Client`]s, one [`MockRic`] per ric name.
#[derive(Debug, Default)]
pub struct MockClientBuilder {
    rics: Mutex<HashMap<String, Arc<MockRic>>>,
    builds: Mutex<Vec<(String, ProtocolType)>>,
}

impl MockClientBuilder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The mock behind `name`, created speaking `STD_V1` on first use.
    pub fn ric(&self, name: &str) -> Arc<MockRic> {
        self.rics
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| MockRic::new(name, ProtocolType::StdV1))
            .clone()
    }

    pub fn register(&self, ric: Arc<MockRic>) {
        self.rics.lock().insert(ric.name().to_string(), ric);
    }

    /// Every `(ric, protocol)` an adapter was built for.
    pub fn builds(&self) -> Vec<(String, ProtocolType)> {
        self.builds.lock().clone()
    }

    /// Factory probing in the default order through this builder.
    pub fn factory(self: &Arc<Self>) -> Arc<A1ClientFactory> {
        Arc::new(A1ClientFactory::new(self.clone()))
    }
}

impl ClientBuilder for MockClientBuilder {
    fn build(&self, ric: &Ric, protocol: ProtocolType) -> A1Result<Arc<dyn A1Client>> {
        if protocol == ProtocolType::Unknown {
            return Err(A1Error::UnsupportedProtocol { protocol });
        }
        self.builds.lock().push((ric.name().to_string(), protocol));
        Ok(Arc::new(MockA1Client::new(protocol, self.ric(ric.name()))))
    }
}
