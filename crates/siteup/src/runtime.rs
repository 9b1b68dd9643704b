use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::database::LibsqlObservationStore;
use crate::events::{EventChannel, NotifyError};
use crate::monitoring::{CheckScheduler, HttpProbe, ProbeError};
use crate::notifier::SlackNotifier;
use crate::observation::{MemoryObservationStore, ObservationStore, StoreError};
use crate::orchestrator::Orchestrator;
use crate::site::StaticSiteDirectory;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to open observation store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build probe: {0}")]
    Probe(#[from] ProbeError),

    #[error("Failed to build notifier: {0}")]
    Notifier(#[from] NotifyError),
}

/// Everything a binary needs, wired from a [`Config`].
pub struct Runtime {
    pub orchestrator: Orchestrator,
    pub events: EventChannel,
    check_interval: Duration,
}

impl Runtime {
    /// Open the store, build the probe and register the Slack subscriber.
    /// Must be called inside a tokio runtime.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let store: Arc<dyn ObservationStore> = match config.database.backend {
            StorageBackend::Libsql => Arc::new(
                LibsqlObservationStore::open(&config.database.path, config.database.max_connections)
                    .await?,
            ),
            StorageBackend::Memory => Arc::new(MemoryObservationStore::new()),
        };

        let probe = Arc::new(HttpProbe::new(config.probe.timeout_seconds)?);
        let directory = Arc::new(StaticSiteDirectory::new(config.sites.iter().cloned()));

        let events = EventChannel::new();
        let notifier = SlackNotifier::new(config.notifications.slack_webhook_url.clone())?;
        events.subscribe(Arc::new(notifier), config.notifications.delivery_policy());

        let orchestrator = Orchestrator::new(directory, probe, store, events.clone())
            .with_max_concurrency(config.checks.max_concurrency);

        info!(
            backend = %config.database.backend,
            sites = config.sites.len(),
            "Runtime ready"
        );

        Ok(Self {
            orchestrator,
            events,
            check_interval: Duration::from_secs(config.checks.interval_seconds),
        })
    }

    pub fn scheduler(&self) -> CheckScheduler {
        CheckScheduler::new(self.orchestrator.clone(), self.check_interval)
    }

    /// Deliver pending notifications and stop the subscriber workers.
    pub async fn shutdown(self) {
        info!("Draining pending notifications");
        self.events.close().await;
    }
}
