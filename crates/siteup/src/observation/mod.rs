//! Append-only liveness history.
//!
//! Every completed probe produces exactly one [`Observation`]. The latest state
//! of a site is never stored on its own; it is always derived from the history
//! through [`ObservationStore::most_recent`].

pub mod memory;

pub use memory::MemoryObservationStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::site::SiteId;

/// One recorded liveness reading for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub site_id: SiteId,
    pub up: bool,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Query(#[from] libsql::Error),

    #[error("Connection pool unavailable: {0}")]
    Pool(#[from] deadpool::managed::PoolError<libsql::Error>),

    #[error("Connection pool could not be built: {0}")]
    PoolBuild(#[from] deadpool::managed::BuildError),

    #[error("Stored timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("Migration v{version} failed: {source}")]
    Migration {
        version: i32,
        #[source]
        source: libsql::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for observations.
///
/// Implementations must be safe for concurrent use: an `append` racing a
/// `most_recent` on the same site never exposes a partially written record.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Record one observation. Failures are always returned to the caller.
    async fn append(
        &self,
        site_id: SiteId,
        up: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// The observation with the greatest `checked_at` for `site_id`.
    ///
    /// Ties are broken by insertion order, the later append wins.
    async fn most_recent(&self, site_id: SiteId) -> Result<Option<Observation>, StoreError>;

    /// Up to `limit` observations for `site_id`, newest first.
    async fn recent(&self, site_id: SiteId, limit: usize) -> Result<Vec<Observation>, StoreError>;
}
