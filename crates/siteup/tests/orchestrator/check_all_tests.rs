//! Batch checks isolate per-site failures

use siteup::MemoryObservationStore;

use crate::support::{Harness, Reply, site};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failing_site_does_not_abort_others() {
    let sites: Vec<_> = (1..=6).map(site).collect();
    let harness = Harness::new(sites.clone(), MemoryObservationStore::new());
    for s in &sites {
        if s.id != 4 {
            harness.probe.push(&s.url, [Reply::Up]);
        }
    }

    let report = harness.orchestrator.check_all(sites.clone()).await;
    harness.drain().await;

    assert_eq!(report.checked(), 5);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].site_id, 4);

    for s in &sites {
        let expected = if s.id == 4 { 0 } else { 1 };
        assert_eq!(harness.history(s.id).await.len(), expected, "site {}", s.id);
    }
    assert!(harness.recorder.events().is_empty());
}

#[tokio::test]
async fn test_two_sites_one_failing_probe() {
    let (a, b) = (site(1), site(2));
    let harness = Harness::new(vec![a.clone(), b.clone()], MemoryObservationStore::new());
    harness.probe.push(&a.url, [Reply::Fail]);
    harness.probe.push(&b.url, [Reply::Down]);

    let report = harness.orchestrator.check_all_sites().await.unwrap();
    harness.drain().await;

    assert_eq!(report.down, vec![2]);
    assert_eq!(report.failed.iter().map(|f| f.site_id).collect::<Vec<_>>(), vec![1]);
    assert!(report.failed[0].error.contains("Probe unavailable"));

    assert!(harness.history(1).await.is_empty());
    assert_eq!(harness.history(2).await.len(), 1);
    assert!(harness.recorder.events_for(1).is_empty());
    assert_eq!(harness.recorder.events_for(2), vec![false]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_cap_still_checks_every_site() {
    let sites: Vec<_> = (1..=20).map(site).collect();
    let mut harness = Harness::new(sites.clone(), MemoryObservationStore::new());
    harness.orchestrator = harness.orchestrator.clone().with_max_concurrency(3);
    for s in &sites {
        harness.probe.push(&s.url, [if s.id % 2 == 0 { Reply::Up } else { Reply::Down }]);
    }

    let report = harness.orchestrator.check_all(sites).await;
    harness.drain().await;

    assert_eq!(report.up.len(), 10);
    assert_eq!(report.down.len(), 10);
    assert!(report.failed.is_empty());
    assert_eq!(harness.recorder.events().len(), 10);
}

#[tokio::test]
async fn test_empty_batch_completes() {
    let harness = Harness::new(vec![], MemoryObservationStore::new());
    let report = harness.orchestrator.check_all_sites().await.unwrap();
    assert_eq!(report.checked(), 0);
    assert!(report.failed.is_empty());
}
