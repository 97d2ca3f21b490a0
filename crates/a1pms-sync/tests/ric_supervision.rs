//! Drift detection across rics.

use std::sync::Arc;

use a1pms_core::{ProtocolType, Repository, RicState};
use a1pms_sync::{DriftReason, RicSupervision, RicVerdict, SkipReason};
use a1pms_testkit::{add_available_ric, add_policy, add_ric, policy, MockClientBuilder, RecordingTrigger};
use assert_matches::assert_matches;

struct Harness {
    repository: Arc<Repository>,
    builder: Arc<MockClientBuilder>,
    trigger: Arc<RecordingTrigger>,
    supervision: RicSupervision,
}

fn harness() -> Harness {
    let repository = Repository::shared();
    let builder = MockClientBuilder::new();
    let trigger = RecordingTrigger::new();
    let supervision = RicSupervision::new(repository.clone(), builder.factory(), trigger.clone());
    Harness {
        repository,
        builder,
        trigger,
        supervision,
    }
}

/// An `AVAILABLE` ric whose RIC matches the repository exactly.
fn consistent_ric(h: &Harness, name: &str) {
    add_available_ric(&h.repository, name, &["t1"]);
    let policy = add_policy(&h.repository, policy(&format!("{name}-p1"), name, "t1", "s1"));
    let remote = h.builder.ric(name);
    remote.add_policy_type("t1", "{}");
    remote.add_remote_policy(policy);
}

fn verdict_for(report: &a1pms_sync::SupervisionReport, ric: &str) -> RicVerdict {
    report
        .verdicts
        .iter()
        .find(|(name, _)| name == ric)
        .map(|(_, verdict)| verdict.clone())
        .unwrap()
}

#[tokio::test]
async fn test_consistent_ric_not_resynchronized() {
    let h = harness();
    consistent_ric(&h, "ric1");

    let report = h.supervision.check_all_rics().await;

    assert_eq!(verdict_for(&report, "ric1"), RicVerdict::Consistent);
    assert!(h.trigger.triggered().is_empty());
}

#[tokio::test]
async fn test_policy_drift_triggers_only_that_ric() {
    let h = harness();
    consistent_ric(&h, "ric1");
    consistent_ric(&h, "ric2");
    h.builder.ric("ric1").add_remote_policy(policy("rogue", "ric1", "t1", "x"));

    let report = h.supervision.check_all_rics().await;

    assert_eq!(
        verdict_for(&report, "ric1"),
        RicVerdict::Resynchronize(DriftReason::Policies)
    );
    assert_eq!(verdict_for(&report, "ric2"), RicVerdict::Consistent);
    assert_eq!(h.trigger.triggered(), vec!["ric1"]);
    assert_eq!(report.triggered(), vec!["ric1"]);
}

#[tokio::test]
async fn test_missing_remote_policy_is_drift() {
    let h = harness();
    consistent_ric(&h, "ric1");
    h.builder.ric("ric1").remove_remote_policy("ric1-p1");

    let report = h.supervision.check_all_rics().await;
    assert_eq!(
        verdict_for(&report, "ric1"),
        RicVerdict::Resynchronize(DriftReason::Policies)
    );
    assert_eq!(h.trigger.count_for("ric1"), 1);
}

#[tokio::test]
async fn test_type_drift_triggers_resync() {
    let h = harness();
    consistent_ric(&h, "ric1");
    h.builder.ric("ric1").add_policy_type("t2", "{}");

    let report = h.supervision.check_all_rics().await;

    assert_eq!(
        verdict_for(&report, "ric1"),
        RicVerdict::Resynchronize(DriftReason::PolicyTypes)
    );
    assert_eq!(h.trigger.count_for("ric1"), 1);
}

#[tokio::test]
async fn test_unavailable_ric_resynchronized_without_query() {
    let h = harness();
    add_ric(&h.repository, "ric1");

    let report = h.supervision.check_all_rics().await;

    assert_eq!(
        verdict_for(&report, "ric1"),
        RicVerdict::Resynchronize(DriftReason::Unavailable)
    );
    assert_eq!(h.trigger.triggered(), vec!["ric1"]);
    assert!(h.builder.ric("ric1").calls().is_empty());
}

#[tokio::test]
async fn test_synchronizing_ric_skipped() {
    let h = harness();
    let ric = add_ric(&h.repository, "ric1");
    assert!(ric.begin_synchronization());

    let report = h.supervision.check_all_rics().await;

    assert_eq!(
        verdict_for(&report, "ric1"),
        RicVerdict::Skipped(SkipReason::Synchronizing)
    );
    assert!(h.trigger.triggered().is_empty());
    assert!(h.builder.ric("ric1").calls().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_skipped_silently() {
    let h = harness();
    consistent_ric(&h, "ric1");
    consistent_ric(&h, "ric2");
    h.builder.ric("ric1").fail_policy_listing(true);

    let report = h.supervision.check_all_rics().await;

    assert_matches!(
        verdict_for(&report, "ric1"),
        RicVerdict::Skipped(SkipReason::FetchFailed(_))
    );
    assert_eq!(verdict_for(&report, "ric2"), RicVerdict::Consistent);
    assert!(h.trigger.triggered().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_forgets_cached_protocol() {
    let h = harness();
    consistent_ric(&h, "ric1");
    let ric = h.repository.rics.get("ric1").unwrap();
    ric.set_protocol(ProtocolType::StdV1);
    h.builder.ric("ric1").fail_policy_listing(true);

    h.supervision.check_all_rics().await;

    assert_eq!(ric.protocol(), ProtocolType::Unknown);
    assert_eq!(ric.state(), RicState::Available);
    assert!(h.builder.ric("ric1").probes().is_empty());

    h.builder.ric("ric1").fail_policy_listing(false);
    let report = h.supervision.check_all_rics().await;

    assert_eq!(verdict_for(&report, "ric1"), RicVerdict::Consistent);
    assert_eq!(h.builder.ric("ric1").probes().last(), Some(&ProtocolType::StdV1));
    assert_eq!(ric.protocol(), ProtocolType::StdV1);
}

#[tokio::test]
async fn test_unreachable_available_ric_skipped() {
    let h = harness();
    consistent_ric(&h, "ric1");
    h.builder.ric("ric1").set_reachable(false);

    let report = h.supervision.check_all_rics().await;

    assert_matches!(
        verdict_for(&report, "ric1"),
        RicVerdict::Skipped(SkipReason::FetchFailed(_))
    );
    assert!(h.trigger.triggered().is_empty());
}

#[tokio::test]
async fn test_supervision_releases_shared_lock() {
    let h = harness();
    consistent_ric(&h, "ric1");

    h.supervision.check_all_rics().await;

    let ric = h.repository.rics.get("ric1").unwrap();
    assert_eq!(ric.lock().lock_count(), 0);
    assert!(ric.lock().try_lock(a1pms_core::LockKind::Exclusive).is_some());
}
