//! Check pipeline: probe a site, compare with its last observation, publish a
//! transition when the state changed and record the new observation.
//!
//! Reads and appends for one site are serialized through a per-site lock, and
//! each new observation is stamped strictly after the previous one, so
//! concurrent checks of the same site can neither duplicate nor miss a
//! transition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::events::EventChannel;
use crate::monitoring::probe::Probe;
use crate::monitoring::types::{CheckAllReport, CheckError, CheckOutcome};
use crate::observation::ObservationStore;
use crate::site::{DirectoryError, Site, SiteDirectory, SiteId};
use crate::transition::{TransitionEvent, detect};

type SiteLocks = HashMap<SiteId, Arc<tokio::sync::Mutex<()>>>;

/// Entry point for "check one" and "check all".
///
/// Cloning is cheap; clones share the store, channel and locks.
#[derive(Clone)]
pub struct Orchestrator {
    directory: Arc<dyn SiteDirectory>,
    probe: Arc<dyn Probe>,
    store: Arc<dyn ObservationStore>,
    events: EventChannel,
    site_locks: Arc<Mutex<SiteLocks>>,
    limiter: Option<Arc<Semaphore>>,
}

impl Orchestrator {
    pub fn new(
        directory: Arc<dyn SiteDirectory>,
        probe: Arc<dyn Probe>,
        store: Arc<dyn ObservationStore>,
        events: EventChannel,
    ) -> Self {
        Self {
            directory,
            probe,
            store,
            events,
            site_locks: Arc::default(),
            limiter: None,
        }
    }

    /// Cap the number of sites probed at once by `check_all`.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.limiter = Some(Arc::new(Semaphore::new(max_concurrency.max(1))));
        self
    }

    pub fn store(&self) -> &Arc<dyn ObservationStore> {
        &self.store
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    /// Resolve `site_id` through the directory and check it.
    pub async fn check_site(&self, site_id: SiteId) -> Result<CheckOutcome, CheckError> {
        let site = self.directory.get(site_id).await.map_err(|e| match e {
            DirectoryError::NotFound(id) => CheckError::SiteNotFound(id),
            DirectoryError::Unavailable(reason) => CheckError::Directory(reason),
        })?;
        self.check_one(&site).await
    }

    /// Probe `site`, record the observation and publish a transition if any.
    ///
    /// A failed probe records nothing and publishes nothing. A persistence
    /// failure is returned even though the transition event, if any, has
    /// already been handed to the channel.
    pub async fn check_one(&self, site: &Site) -> Result<CheckOutcome, CheckError> {
        let up = self.probe.probe(&site.url).await.map_err(|source| {
            CheckError::ProbeUnavailable { site_id: site.id, url: site.url.clone(), source }
        })?;

        let lock = self.site_lock(site.id);
        let _guard = lock.lock().await;

        let previous = self.store.most_recent(site.id).await?;
        // A site without history is assumed to have been up.
        let previous_up = previous.as_ref().is_none_or(|observation| observation.up);

        if let Some(transition) = detect(previous_up, up) {
            info!(site_id = site.id, url = %site.url, %transition, "Site changed state");
            self.events.publish(TransitionEvent::new(site.clone(), transition));
        }

        let checked_at = next_checked_at(previous.map(|observation| observation.checked_at));
        self.store.append(site.id, up, checked_at).await?;

        debug!(site_id = site.id, up, %checked_at, "Observation recorded");
        Ok(CheckOutcome { up })
    }

    /// Check every site concurrently and wait for all of them.
    ///
    /// Per-site errors are logged and recorded in the report. Dropping the
    /// returned future leaves already spawned checks running to completion.
    pub async fn check_all(&self, sites: Vec<Site>) -> CheckAllReport {
        let handles: Vec<_> = sites
            .into_iter()
            .map(|site| {
                let orchestrator = self.clone();
                let site_id = site.id;
                let handle = tokio::spawn(async move {
                    let _permit = match &orchestrator.limiter {
                        Some(limiter) => limiter.clone().acquire_owned().await.ok(),
                        None => None,
                    };
                    orchestrator.check_one(&site).await
                });
                (site_id, handle)
            })
            .collect();

        let mut report = CheckAllReport::default();
        for (site_id, handle) in handles {
            let result = match handle.await {
                Ok(Ok(outcome)) => Ok(outcome),
                Ok(Err(e)) => {
                    warn!(site_id, "Check failed: {}", e);
                    Err(e.to_string())
                }
                Err(e) => {
                    error!(site_id, "Check task terminated abnormally: {}", e);
                    Err(e.to_string())
                }
            };
            report.record(site_id, result);
        }

        info!(
            up = report.up.len(),
            down = report.down.len(),
            failed = report.failed.len(),
            "Checked all sites"
        );
        report
    }

    /// List the directory and check every site in it.
    pub async fn check_all_sites(&self) -> Result<CheckAllReport, CheckError> {
        let sites = self.directory.list().await.map_err(|e| CheckError::Directory(e.to_string()))?;
        Ok(self.check_all(sites).await)
    }

    fn site_lock(&self, site_id: SiteId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.site_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(site_id).or_default().clone()
    }
}

/// Current time at microsecond precision, strictly after `previous`.
fn next_checked_at(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    let now = DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now);
    match previous {
        Some(previous) if now <= previous => previous + TimeDelta::microseconds(1),
        _ => now,
    }
}
