//! End-to-end synchronization of a ric against a scripted RIC.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use a1pms_core::{ProtocolType, Repository, RicState};
use a1pms_sync::{RicSynchronizationTask, SyncError, SyncOutcome};
use a1pms_testkit::{add_policy, add_ric, policy, service, MockCall, MockClientBuilder, RecordingNotifier};
use assert_matches::assert_matches;

struct Harness {
    repository: Arc<Repository>,
    builder: Arc<MockClientBuilder>,
    notifier: Arc<RecordingNotifier>,
    task: RicSynchronizationTask,
}

fn harness() -> Harness {
    let repository = Repository::shared();
    let builder = MockClientBuilder::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let task = RicSynchronizationTask::new(repository.clone(), builder.factory(), notifier.clone());
    Harness {
        repository,
        builder,
        notifier,
        task,
    }
}

/// ric1 with one confirmed and one transient policy; the RIC itself holds a
/// stale policy and reports two types.
fn populated() -> Harness {
    let h = harness();
    add_ric(&h.repository, "ric1");
    add_policy(&h.repository, policy("p1", "ric1", "t1", "s1"));
    add_policy(&h.repository, policy("p2", "ric1", "t1", "s1").transient());
    h.repository
        .services
        .put(service("s1", Duration::from_secs(60), "http://s1/callback"));
    h.repository.services.put(service("s2", Duration::from_secs(60), ""));

    let remote = h.builder.ric("ric1");
    remote.add_policy_type("t1", "{\"title\":\"t1\"}").add_policy_type("t2", "{\"title\":\"t2\"}");
    remote.add_remote_policy(policy("stale", "ric1", "t1", "other"));
    h
}

#[tokio::test]
async fn test_synchronization_restores_desired_state() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();

    assert_eq!(h.task.run(&ric).await, SyncOutcome::Completed);

    assert_eq!(ric.state(), RicState::Available);
    assert_eq!(ric.protocol(), ProtocolType::StdV1);
    let remote = h.builder.ric("ric1");
    assert_eq!(remote.remote_policy_ids(), BTreeSet::from(["p1".to_string()]));
    assert_eq!(remote.puts(), vec!["p1"]);
    assert_eq!(ric.supported_type_names(), BTreeSet::from(["t1".to_string(), "t2".to_string()]));
    assert_eq!(h.repository.policy_types.get("t2").unwrap().schema, "{\"title\":\"t2\"}");
    assert!(!h.repository.policies.contains("p2"));
    assert!(h.repository.policies.contains("p1"));
    assert_eq!(
        h.notifier.sent(),
        vec![(
            "http://s1/callback".to_string(),
            "Synchronization completed for:ric1".to_string()
        )]
    );
    assert_eq!(ric.lock().lock_count(), 0);
}

#[tokio::test]
async fn test_known_types_are_not_refetched() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();

    h.task.run(&ric).await;

    let remote = h.builder.ric("ric1");
    assert_eq!(remote.count(&MockCall::GetSchema("t1".to_string())), 0);
    assert_eq!(remote.count(&MockCall::GetSchema("t2".to_string())), 1);
}

#[tokio::test]
async fn test_resynchronization_is_idempotent() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();

    assert_eq!(h.task.run(&ric).await, SyncOutcome::Completed);
    let after_first = h.builder.ric("ric1").remote_policy_ids();
    assert_eq!(h.task.run(&ric).await, SyncOutcome::Completed);

    assert_eq!(h.builder.ric("ric1").remote_policy_ids(), after_first);
    assert_eq!(ric.supported_type_names().len(), 2);
    assert_eq!(h.repository.policies.size(), 1);
}

#[tokio::test]
async fn test_delete_all_retried_once_then_fails() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    let remote = h.builder.ric("ric1");
    remote.fail_delete_all(2);

    let outcome = h.task.run(&ric).await;

    assert_matches!(outcome, SyncOutcome::Failed(SyncError::DeleteAll(_)));
    assert_eq!(ric.state(), RicState::Unavailable);
    assert_eq!(remote.count(&MockCall::DeleteAll), 2);
    assert_eq!(remote.count(&MockCall::ListTypes), 0);
    assert!(remote.puts().is_empty());
    assert!(h.notifier.sent().is_empty());
    // Transient policies go even when the run fails.
    assert!(!h.repository.policies.contains("p2"));
    assert!(h.repository.policies.contains("p1"));
    assert_eq!(ric.protocol(), ProtocolType::Unknown);
}

#[tokio::test]
async fn test_delete_all_succeeds_on_retry() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    h.builder.ric("ric1").fail_delete_all(1);

    assert_eq!(h.task.run(&ric).await, SyncOutcome::Completed);
    assert_eq!(h.builder.ric("ric1").count(&MockCall::DeleteAll), 2);
    assert_eq!(ric.state(), RicState::Available);
}

#[tokio::test]
async fn test_unreachable_ric_fails_client_creation() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    h.builder.ric("ric1").set_reachable(false);

    assert_matches!(h.task.run(&ric).await, SyncOutcome::Failed(SyncError::ClientCreation(_)));
    assert_eq!(ric.state(), RicState::Unavailable);
    assert!(!h.repository.policies.contains("p2"));
}

#[tokio::test]
async fn test_type_listing_failure_fails_run() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    h.builder.ric("ric1").fail_type_listing(true);

    assert_matches!(h.task.run(&ric).await, SyncOutcome::Failed(SyncError::PolicyTypes(_)));
    assert_eq!(ric.state(), RicState::Unavailable);
    assert!(h.builder.ric("ric1").puts().is_empty());
}

#[tokio::test]
async fn test_rejected_policy_does_not_fail_run() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    add_policy(&h.repository, policy("p3", "ric1", "t1", "s1"));
    h.builder.ric("ric1").fail_put("p1");

    assert_eq!(h.task.run(&ric).await, SyncOutcome::Completed);
    assert_eq!(h.builder.ric("ric1").remote_policy_ids(), BTreeSet::from(["p3".to_string()]));
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_run() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    h.notifier.fail_for("http://s1/callback");

    assert_eq!(h.task.run(&ric).await, SyncOutcome::Completed);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_concurrent_run_is_noop() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    assert!(ric.begin_synchronization());

    assert_eq!(h.task.run(&ric).await, SyncOutcome::AlreadyRunning);
    assert!(h.builder.ric("ric1").calls().is_empty());
    assert_eq!(ric.state(), RicState::Synchronizing);
}

#[tokio::test(start_paused = true)]
async fn test_synchronization_waits_for_shared_holders() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    let reader = ric.lock().lock_shared().await;

    let handle = h.task.spawn(ric.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(ric.state(), RicState::Synchronizing);
    assert!(h.builder.ric("ric1").calls().is_empty());

    drop(reader);
    assert_eq!(handle.await.unwrap(), SyncOutcome::Completed);
    assert_eq!(ric.state(), RicState::Available);
}

#[tokio::test(start_paused = true)]
async fn test_aborted_run_leaves_ric_unavailable() {
    let h = populated();
    let ric = h.repository.rics.get("ric1").unwrap();
    let reader = ric.lock().lock_shared().await;

    let handle = h.task.spawn(ric.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());

    assert_eq!(ric.state(), RicState::Unavailable);
    drop(reader);
    assert_eq!(ric.lock().lock_count(), 0);
}
