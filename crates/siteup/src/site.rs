use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type SiteId = i64;

/// A monitored site. Owned by the directory, read-only for the checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub url: String,
}

impl Site {
    pub fn new(id: SiteId, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Site {0} not found")]
    NotFound(SiteId),

    #[error("Site directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup service for monitored sites.
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    async fn get(&self, id: SiteId) -> Result<Site, DirectoryError>;

    async fn list(&self) -> Result<Vec<Site>, DirectoryError>;
}

/// Directory over a fixed set of sites, typically the `[[sites]]` config table.
#[derive(Debug, Clone, Default)]
pub struct StaticSiteDirectory {
    sites: BTreeMap<SiteId, Site>,
}

impl StaticSiteDirectory {
    /// Later entries replace earlier ones with the same id.
    pub fn new(sites: impl IntoIterator<Item = Site>) -> Self {
        Self { sites: sites.into_iter().map(|site| (site.id, site)).collect() }
    }
}

#[async_trait]
impl SiteDirectory for StaticSiteDirectory {
    async fn get(&self, id: SiteId) -> Result<Site, DirectoryError> {
        self.sites.get(&id).cloned().ok_or(DirectoryError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Site>, DirectoryError> {
        Ok(self.sites.values().cloned().collect())
    }
}
