use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Observation, ObservationStore, StoreError};
use crate::site::SiteId;

/// Process-local store, used by tests and `backend = "memory"`.
///
/// Each site's history is kept sorted by `checked_at`; equal timestamps stay
/// in insertion order so the last element is always the most recent one.
#[derive(Debug, Default)]
pub struct MemoryObservationStore {
    histories: RwLock<HashMap<SiteId, Vec<Observation>>>,
}

impl MemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full history of a site, oldest first.
    pub async fn history(&self, site_id: SiteId) -> Vec<Observation> {
        self.histories.read().await.get(&site_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ObservationStore for MemoryObservationStore {
    async fn append(
        &self,
        site_id: SiteId,
        up: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut histories = self.histories.write().await;
        let history = histories.entry(site_id).or_default();
        let position = history.partition_point(|existing| existing.checked_at <= checked_at);
        history.insert(position, Observation { site_id, up, checked_at });
        Ok(())
    }

    async fn most_recent(&self, site_id: SiteId) -> Result<Option<Observation>, StoreError> {
        Ok(self.histories.read().await.get(&site_id).and_then(|h| h.last().cloned()))
    }

    async fn recent(&self, site_id: SiteId, limit: usize) -> Result<Vec<Observation>, StoreError> {
        let histories = self.histories.read().await;
        Ok(histories
            .get(&site_id)
            .map(|h| h.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
