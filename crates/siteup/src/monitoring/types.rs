use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::probe::ProbeError;
use crate::observation::StoreError;
use crate::site::SiteId;

/// Result of checking one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub up: bool,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Site {0} not found")]
    SiteNotFound(SiteId),

    #[error("Probe unavailable for site {site_id} ({url}): {source}")]
    ProbeUnavailable {
        site_id: SiteId,
        url: String,
        #[source]
        source: ProbeError,
    },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("Site directory failure: {0}")]
    Directory(String),
}

/// Per-site failure recorded by a batch check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteFailure {
    pub site_id: SiteId,
    pub error: String,
}

/// Summary of a `check_all` run. Failures are recorded, never propagated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckAllReport {
    pub up: Vec<SiteId>,
    pub down: Vec<SiteId>,
    pub failed: Vec<SiteFailure>,
}

impl CheckAllReport {
    pub fn checked(&self) -> usize {
        self.up.len() + self.down.len()
    }

    pub(crate) fn record(&mut self, site_id: SiteId, result: Result<CheckOutcome, String>) {
        match result {
            Ok(CheckOutcome { up: true }) => self.up.push(site_id),
            Ok(CheckOutcome { up: false }) => self.down.push(site_id),
            Err(error) => self.failed.push(SiteFailure { site_id, error }),
        }
    }
}
