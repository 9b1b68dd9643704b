use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::DeliveryPolicy;
use crate::site::Site;
use crate::validation::{self, ValidationError};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SITEUP_CONFIG";
/// Secret webhook URL, takes precedence over the file.
pub const SLACK_WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        path: path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("No config path available, set SITEUP_CONFIG or HOME")]
    ConfigPathUnavailable,

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sites: Vec<Site>,
    pub database: DatabaseConfig,
    pub probe: ProbeConfig,
    pub checks: ChecksConfig,
    pub notifications: NotificationsConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Libsql,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Libsql => write!(f, "libsql"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub path: path::PathBuf,
    pub max_connections: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Libsql, path: "siteup.db".into(), max_connections: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Period of the "check all" schedule.
    pub interval_seconds: u64,
    /// Sites probed at once during "check all".
    pub max_concurrency: usize,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self { interval_seconds: 3600, max_concurrency: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub slack_webhook_url: Option<String>,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { slack_webhook_url: None, max_attempts: 3, retry_backoff_ms: 500 }
    }
}

impl NotificationsConfig {
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            max_attempts: self.max_attempts,
            backoff: std::time::Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($SITEUP_CONFIG, $XDG_CONFIG_HOME/siteup/config.toml
/// or $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Ok(normalize_toml_path(path::Path::new(&path)));
    }

    #[allow(deprecated)]
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("siteup/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Database")?;
        write_1(f, "Backend", &self.database.backend)?;
        write_1(f, "Path", &self.database.path.display())?;
        write_1(f, "Max Connections", &self.database.max_connections)?;
        write_title_1(f, "Probe")?;
        write_1(f, "Timeout (s)", &self.probe.timeout_seconds)?;
        write_title_1(f, "Checks")?;
        write_1(f, "Interval (s)", &self.checks.interval_seconds)?;
        write_1(f, "Max Concurrency", &self.checks.max_concurrency)?;
        write_title_1(f, "Notifications")?;
        let webhook = if self.notifications.slack_webhook_url.is_some() { "set" } else { "unset" };
        write_1(f, "Slack Webhook", &webhook)?;
        write_1(f, "Max Attempts", &self.notifications.max_attempts)?;
        write_1(f, "Retry Backoff (ms)", &self.notifications.retry_backoff_ms)?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title_1(f, "Sites")?;
        for site in &self.sites {
            write_1(f, &site.id.to_string(), &site.url)?;
        }

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/siteup/config.toml
    ///  or the specified path, with the name config.toml if one does not exist.
    /// `SLACK_WEBHOOK_URL` overrides the webhook from the file.
    ///
    /// ```rust,ignore
    /// let cfg = siteup::Config::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let mut config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            tracing::info!(path = %config_path.display(), "Wrote default config");
            config
        };

        if let Ok(webhook) = env::var(SLACK_WEBHOOK_ENV) {
            config.notifications.slack_webhook_url = Some(webhook);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_timeout(self.probe.timeout_seconds)?;
        validation::validate_check_interval(self.checks.interval_seconds)?;
        validation::validate_sites(&self.sites)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::WriteFailed { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })
    }
}
