//! Common test fixtures.

use std::sync::Arc;
use std::time::Duration;

use a1pms_core::{ControllerConfig, Policy, PolicyType, Repository, Ric, RicConfig, Service};

pub fn ric_config(name: &str) -> RicConfig {
    RicConfig::new(name, format!("http://{name}:8085")).with_managed_elements([format!("{name}-me1")])
}

/// Register a ric in the repository and return it.
pub fn add_ric(repository: &Repository, name: &str) -> Arc<Ric> {
    let ric = Arc::new(Ric::new(ric_config(name)));
    repository.rics.put(ric.clone());
    ric
}

/// Register an `AVAILABLE` ric that reports `types`; the types are added
/// to the repository too.
pub fn add_available_ric(repository: &Repository, name: &str, types: &[&str]) -> Arc<Ric> {
    let ric = add_ric(repository, name);
    let types: Vec<PolicyType> = types.iter().map(|t| policy_type(t)).collect();
    for policy_type in &types {
        repository.policy_types.put(policy_type.clone());
    }
    ric.replace_supported_types(types);
    make_available(&ric);
    ric
}

/// Drive a ric through a successful synchronization transition.
pub fn make_available(ric: &Ric) {
    if ric.begin_synchronization() {
        ric.complete_synchronization();
    }
}

pub fn policy_type(name: &str) -> PolicyType {
    PolicyType::new(name, format!("{{\"title\":\"{name}\"}}"))
}

pub fn policy(id: &str, ric: &str, policy_type: &str, service: &str) -> Policy {
    Policy::new(id, ric, policy_type, service, format!("{{\"id\":\"{id}\"}}"))
}

/// Insert a policy, creating its type if needed. The ric must exist.
pub fn add_policy(repository: &Repository, policy: Policy) -> Policy {
    if !repository.policy_types.contains(&policy.policy_type) {
        repository.policy_types.put(policy_type(&policy.policy_type));
    }
    repository.put_policy(policy.clone()).unwrap();
    policy
}

pub fn service(name: &str, keep_alive: Duration, callback_url: &str) -> Service {
    Service::new(name, keep_alive, callback_url)
}

pub fn controller(name: &str) -> ControllerConfig {
    ControllerConfig {
        name: name.to_string(),
        base_url: format!("http://{name}:8181"),
        username: "admin".to_string(),
        password: "Kp8bJ4SXszM0WXlhak3eHlcse2gAw84vaoGGmJvUy2U".to_string(),
    }
}
