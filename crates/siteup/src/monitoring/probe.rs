use std::time::{Duration, Instant};

use thiserror::Error;
use url::Url;

/// Why a probe could not decide whether a site is up.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The target did not answer in time. Also the variant for custom
    /// [`Probe`] implementations that fail without a transport error.
    #[error("Unreachable: {0}")]
    Unreachable(String),
}

/// Reachability check for a single URL.
///
/// `Ok(false)` means the site answered and is down; `Err` means liveness could
/// not be determined at all.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError>;
}

/// HTTP/HTTPS probe
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout_seconds: u64) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }
}

/// Scheme-less targets such as `example.com` are probed over https. An
/// explicit scheme is kept as written, so `ftp://host` stays `ftp`.
pub fn normalize_url(target: &str) -> Result<Url, ProbeError> {
    let target = target.trim();
    let with_scheme = if has_scheme(target) { target.to_string() } else { format!("https://{target}") };

    Url::parse(&with_scheme).map_err(|e| ProbeError::InvalidUrl(format!("{target}: {e}")))
}

fn has_scheme(target: &str) -> bool {
    target.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[async_trait::async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, url: &str) -> Result<bool, ProbeError> {
        let url = normalize_url(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidUrl(format!("unsupported scheme {}", url.scheme())));
        }
        let start = Instant::now();

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Unreachable(format!("{url}: timed out"))
            } else {
                ProbeError::Request(e)
            }
        })?;

        let status = response.status();
        // Consider 2xx and 3xx as up
        let up = status.is_success() || status.is_redirection();
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            up,
            "Probe completed"
        );
        Ok(up)
    }
}
