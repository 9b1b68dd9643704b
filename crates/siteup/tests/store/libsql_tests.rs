//! Durable store behaviour

use anyhow::Result;
use chrono::{TimeDelta, Utc};
use siteup::{LibsqlObservationStore, ObservationStore};
use tempfile::tempdir;

use crate::support::{Harness, Reply, expected_transitions, site};

#[tokio::test]
async fn test_append_and_most_recent() -> Result<()> {
    let dir = tempdir()?;
    let store = LibsqlObservationStore::open(&dir.path().join("checks.db"), 4).await?;

    assert!(store.most_recent(1).await?.is_none());

    let t1 = Utc::now() - TimeDelta::seconds(30);
    let t2 = t1 + TimeDelta::seconds(10);
    store.append(1, true, t1).await?;
    store.append(1, false, t2).await?;
    store.append(2, true, t2 + TimeDelta::seconds(1)).await?;

    let latest = store.most_recent(1).await?.unwrap();
    assert_eq!(latest.site_id, 1);
    assert!(!latest.up);
    assert_eq!(latest.checked_at.timestamp_micros(), t2.timestamp_micros());

    let recent = store.recent(1, 10).await?;
    assert_eq!(recent.iter().map(|o| o.up).collect::<Vec<_>>(), vec![false, true]);
    Ok(())
}

#[tokio::test]
async fn test_equal_timestamps_prefer_later_insert() -> Result<()> {
    let dir = tempdir()?;
    let store = LibsqlObservationStore::open(&dir.path().join("checks.db"), 2).await?;

    let t = chrono::DateTime::from_timestamp_micros(Utc::now().timestamp_micros()).unwrap();
    store.append(5, false, t).await?;
    store.append(5, true, t).await?;

    assert!(store.most_recent(5).await?.unwrap().up);
    Ok(())
}

#[tokio::test]
async fn test_history_survives_reopen() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("checks.db");

    {
        let store = LibsqlObservationStore::open(&path, 2).await?;
        store.append(3, false, Utc::now()).await?;
    }

    let store = LibsqlObservationStore::open(&path, 2).await?;
    let latest = store.most_recent(3).await?.unwrap();
    assert!(!latest.up);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pipeline_over_libsql() -> Result<()> {
    let dir = tempdir()?;
    let store = LibsqlObservationStore::open(&dir.path().join("checks.db"), 4).await?;

    let sites: Vec<_> = (1..=4).map(site).collect();
    let harness = Harness::new(sites.clone(), store);
    for s in &sites {
        harness.probe.push(&s.url, [Reply::Up, Reply::Down, Reply::Down, Reply::Up]);
    }

    for _ in 0..4 {
        let report = harness.orchestrator.check_all(sites.clone()).await;
        assert!(report.failed.is_empty(), "{:?}", report.failed);
    }
    harness.drain().await;

    for s in &sites {
        let history = harness.history(s.id).await;
        assert_eq!(history.iter().map(|o| o.up).collect::<Vec<_>>(), vec![true, false, false, true]);
        assert_eq!(harness.recorder.events_for(s.id), expected_transitions(&history));
    }
    Ok(())
}
