//! Error taxonomy of a single check

use std::sync::Arc;
use std::sync::atomic::Ordering;

use siteup::{CheckError, EventChannel, MemoryObservationStore, Orchestrator, StaticSiteDirectory};

use crate::support::{
    BrokenSubscriber, FlakyStore, Harness, RecordingSubscriber, Reply, ScriptedProbe, quick_policy,
    site,
};

#[tokio::test]
async fn test_unknown_site_is_not_found() {
    let harness = Harness::new(vec![site(1)], MemoryObservationStore::new());

    let result = harness.orchestrator.check_site(42).await;
    assert!(matches!(result, Err(CheckError::SiteNotFound(42))));
}

#[tokio::test]
async fn test_probe_failure_records_nothing() {
    let harness = Harness::new(vec![site(1)], MemoryObservationStore::new());
    harness.probe.push(&site(1).url, [Reply::Fail]);

    let result = harness.orchestrator.check_one(&site(1)).await;
    harness.drain().await;

    assert!(matches!(result, Err(CheckError::ProbeUnavailable { site_id: 1, .. })));
    assert!(harness.history(1).await.is_empty());
    assert!(harness.recorder.events().is_empty());
}

#[tokio::test]
async fn test_probe_failure_after_down_is_not_a_recovery_or_repeat() {
    let harness = Harness::new(vec![site(1)], MemoryObservationStore::new());
    harness.probe.push(&site(1).url, [Reply::Down, Reply::Fail, Reply::Down]);

    harness.orchestrator.check_one(&site(1)).await.unwrap();
    assert!(harness.orchestrator.check_one(&site(1)).await.is_err());
    harness.orchestrator.check_one(&site(1)).await.unwrap();
    harness.drain().await;

    assert_eq!(harness.history(1).await.len(), 2);
    assert_eq!(harness.recorder.events_for(1), vec![false]);
}

#[tokio::test]
async fn test_persistence_failure_surfaces_after_event_was_offered() {
    let harness = Harness::new(vec![site(1)], FlakyStore::default());
    harness.store.fail_appends.store(true, Ordering::SeqCst);
    harness.probe.push(&site(1).url, [Reply::Down]);

    let result = harness.orchestrator.check_one(&site(1)).await;
    harness.drain().await;

    assert!(matches!(result, Err(CheckError::Persistence(_))));
    assert_eq!(harness.recorder.events_for(1), vec![false]);
    assert!(harness.history(1).await.is_empty());
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_check() {
    let probe = Arc::new(ScriptedProbe::default());
    let store = Arc::new(MemoryObservationStore::new());
    let recorder = Arc::new(RecordingSubscriber::default());
    let events = EventChannel::new();
    events.subscribe(Arc::new(BrokenSubscriber), quick_policy());
    events.subscribe(recorder.clone(), quick_policy());

    let orchestrator = Orchestrator::new(
        Arc::new(StaticSiteDirectory::new([site(1)])),
        probe.clone(),
        store.clone(),
        events.clone(),
    );
    probe.push(&site(1).url, [Reply::Down, Reply::Up]);

    assert!(!orchestrator.check_site(1).await.unwrap().up);
    assert!(orchestrator.check_site(1).await.unwrap().up);
    events.close().await;

    assert_eq!(store.history(1).await.len(), 2);
    assert_eq!(recorder.events_for(1), vec![false, true]);
}
