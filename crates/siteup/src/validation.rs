//! Sanity checks applied to configuration before anything is probed.

use std::collections::HashSet;

use thiserror::Error;

use crate::monitoring::probe::normalize_url;
use crate::site::{Site, SiteId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL for site {site_id}: {reason}")]
    InvalidUrl { site_id: SiteId, reason: String },

    #[error("Duplicate site id {0}")]
    DuplicateSite(SiteId),

    #[error("Check interval too short: {0} seconds (minimum: 10)")]
    IntervalTooShort(u64),

    #[error("Check interval too long: {0} seconds (maximum: 86400)")]
    IntervalTooLong(u64),

    #[error("Timeout out of range: {0} seconds (allowed: 1..=300)")]
    TimeoutOutOfRange(u64),
}

const MIN_INTERVAL: u64 = 10; // 10 seconds
const MAX_INTERVAL: u64 = 86400; // 24 hours
const MIN_TIMEOUT: u64 = 1;
const MAX_TIMEOUT: u64 = 300; // 5 minutes

/// Only http(s) targets with a host can be probed.
pub fn validate_site(site: &Site) -> Result<(), ValidationError> {
    let url = normalize_url(&site.url)
        .map_err(|e| ValidationError::InvalidUrl { site_id: site.id, reason: e.to_string() })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::InvalidUrl {
                site_id: site.id,
                reason: format!("unsupported scheme {other}"),
            });
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidUrl { site_id: site.id, reason: "missing host".into() });
    }

    if url.port() == Some(0) {
        return Err(ValidationError::InvalidUrl { site_id: site.id, reason: "port 0".into() });
    }

    Ok(())
}

pub fn validate_sites(sites: &[Site]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for site in sites {
        validate_site(site)?;
        if !seen.insert(site.id) {
            return Err(ValidationError::DuplicateSite(site.id));
        }
    }
    Ok(())
}

pub fn validate_check_interval(interval_seconds: u64) -> Result<(), ValidationError> {
    if interval_seconds < MIN_INTERVAL {
        return Err(ValidationError::IntervalTooShort(interval_seconds));
    }

    if interval_seconds > MAX_INTERVAL {
        return Err(ValidationError::IntervalTooLong(interval_seconds));
    }

    Ok(())
}

pub fn validate_timeout(timeout_seconds: u64) -> Result<(), ValidationError> {
    if !(MIN_TIMEOUT..=MAX_TIMEOUT).contains(&timeout_seconds) {
        return Err(ValidationError::TimeoutOutOfRange(timeout_seconds));
    }
    Ok(())
}
