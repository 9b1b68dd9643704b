use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Row, params};

use super::migrations::run_migrations;
use crate::observation::{Observation, ObservationStore, StoreError};
use crate::pool::{LibsqlManager, LibsqlPool};
use crate::site::SiteId;

/// Observation store backed by a local libsql database.
pub struct LibsqlObservationStore {
    pool: LibsqlPool,
}

impl LibsqlObservationStore {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub async fn open(path: &Path, max_connections: usize) -> Result<Self, StoreError> {
        let database = libsql::Builder::new_local(path).build().await?;
        let pool = LibsqlPool::builder(LibsqlManager::new(database))
            .max_size(max_connections.max(1))
            .build()?;

        let store = Self::new_from_pool(pool);
        let conn = store.pool.get().await?;
        run_migrations(&conn).await?;
        drop(conn);

        tracing::info!(path = %path.display(), "Observation store opened");
        Ok(store)
    }

    /// Wrap an existing pool. The schema is assumed to be migrated.
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>, StoreError> {
        Ok(self.pool.get().await?)
    }
}

fn row_to_observation(row: &Row) -> Result<Observation, StoreError> {
    let checked_at: i64 = row.get(2)?;
    Ok(Observation {
        site_id: row.get(0)?,
        up: row.get::<i64>(1)? != 0,
        checked_at: DateTime::from_timestamp_micros(checked_at)
            .ok_or(StoreError::InvalidTimestamp(checked_at))?,
    })
}

#[async_trait]
impl ObservationStore for LibsqlObservationStore {
    async fn append(
        &self,
        site_id: SiteId,
        up: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO checks (site_id, up, checked_at) VALUES (?, ?, ?)",
            params![site_id, if up { 1 } else { 0 }, checked_at.timestamp_micros()],
        )
        .await?;
        Ok(())
    }

    async fn most_recent(&self, site_id: SiteId) -> Result<Option<Observation>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT site_id, up, checked_at FROM checks WHERE site_id = ? ORDER BY checked_at DESC, id DESC LIMIT 1",
                params![site_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_observation(&row)?)),
            None => Ok(None),
        }
    }

    async fn recent(&self, site_id: SiteId, limit: usize) -> Result<Vec<Observation>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT site_id, up, checked_at FROM checks WHERE site_id = ? ORDER BY checked_at DESC, id DESC LIMIT ?",
                params![site_id, limit as i64],
            )
            .await?;

        let mut observations = Vec::new();
        while let Some(row) = rows.next().await? {
            observations.push(row_to_observation(&row)?);
        }
        Ok(observations)
    }
}
