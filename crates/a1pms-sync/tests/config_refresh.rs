//! Applying ric configuration changes.

use std::sync::Arc;

use a1pms_core::{ProtocolType, Repository, RepositoryError};
use a1pms_sync::{diff_ric_configs, RemovalMode, RicConfigRefresh, RicConfigUpdate};
use a1pms_testkit::{add_policy, add_ric, policy, ric_config, RecordingTrigger};
use assert_matches::assert_matches;

fn setup() -> (Arc<Repository>, Arc<RecordingTrigger>, RicConfigRefresh) {
    let repository = Repository::shared();
    let trigger = RecordingTrigger::new();
    let refresh = RicConfigRefresh::new(repository.clone(), trigger.clone());
    (repository, trigger, refresh)
}

#[test]
fn test_diff_reports_each_kind_of_change() {
    let repository = Repository::new();
    add_ric(&repository, "kept");
    add_ric(&repository, "moved");
    add_ric(&repository, "gone");

    let mut moved = ric_config("moved");
    moved.base_url = "http://elsewhere:8085".to_string();
    let updates = diff_ric_configs(&repository, &[ric_config("kept"), moved.clone(), ric_config("new")]);

    assert_eq!(
        updates,
        vec![
            RicConfigUpdate::Changed(moved),
            RicConfigUpdate::Added(ric_config("new")),
            RicConfigUpdate::Removed("gone".to_string()),
        ]
    );
}

#[test]
fn test_unchanged_configuration_is_noop() {
    let (repository, trigger, refresh) = setup();
    add_ric(&repository, "ric1");

    assert!(refresh.refresh(&[ric_config("ric1")]).is_empty());
    assert!(trigger.triggered().is_empty());
    assert_eq!(repository.rics.size(), 1);
}

#[test]
fn test_added_ric_is_synchronized() {
    let (repository, trigger, refresh) = setup();

    assert!(refresh.refresh(&[ric_config("ric1")]).is_empty());

    assert!(repository.rics.contains("ric1"));
    assert_eq!(trigger.triggered(), vec!["ric1"]);
    assert!(repository.rics.lookup_by_managed_element("ric1-me1").is_some());
}

#[test]
fn test_changed_ric_keeps_identity_and_forgets_protocol() {
    let (repository, trigger, refresh) = setup();
    let ric = add_ric(&repository, "ric1");
    ric.set_protocol(ProtocolType::OscV1);

    let mut changed = ric_config("ric1");
    changed.base_url = "http://ric1-new:8085".to_string();
    assert!(refresh.refresh(&[changed]).is_empty());

    let current = repository.rics.get("ric1").unwrap();
    assert!(Arc::ptr_eq(&ric, &current));
    assert_eq!(current.base_url(), "http://ric1-new:8085");
    assert_eq!(current.protocol(), ProtocolType::Unknown);
    assert!(trigger.triggered().is_empty());
}

#[test]
fn test_guarded_removal_refuses_ric_with_policies() {
    let (repository, _trigger, refresh) = setup();
    add_ric(&repository, "ric1");
    add_ric(&repository, "ric2");
    add_policy(&repository, policy("p1", "ric1", "t1", "s1"));

    let failures = refresh.refresh(&[]);

    assert_eq!(failures.len(), 1);
    assert_matches!(
        &failures[0],
        (RicConfigUpdate::Removed(name), RepositoryError::RicHasPolicies { count: 1, .. }) if name == "ric1"
    );
    assert!(repository.rics.contains("ric1"));
    assert!(!repository.rics.contains("ric2"));
}

#[test]
fn test_cascade_removal_drops_policies() {
    let (repository, _trigger, refresh) = setup();
    let refresh = refresh.with_removal_mode(RemovalMode::Cascade);
    add_ric(&repository, "ric1");
    add_policy(&repository, policy("p1", "ric1", "t1", "s1"));

    assert!(refresh.refresh(&[]).is_empty());

    assert!(!repository.rics.contains("ric1"));
    assert!(!repository.policies.contains("p1"));
}
