//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calsync/config.toml` by default. A missing file means
//! defaults everywhere.

use std::path::{Path, PathBuf};
use std::time::Duration;

use calsync_core::{LogFormat, ReminderSettings, TracingConfig};
use calsync_core::{DEFAULT_REMINDER_HOUR, MAX_REMINDERS_PER_EVENT};
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Default REST API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default length of a timed event created or dropped without an end.
pub const DEFAULT_TIMED_DURATION_MINUTES: u32 = 60;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the calsync client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// IANA time zone used for all-day boundaries. System local when unset.
    pub timezone: Option<String>,

    /// Debug logging.
    pub debug: bool,

    /// Log output settings.
    pub logging: LoggingSettings,

    /// Store connection settings.
    pub store: StoreSettings,

    /// Reminder settings.
    pub reminders: ReminderSection,

    /// Calendar view settings.
    pub view: ViewSettings,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `pretty`, `compact`, `json`.
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default().to_string(),
        }
    }
}

/// Store connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// API root, e.g. `http://localhost:5000/api`.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[reminders]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSection {
    /// Local hour all-day presets fire at.
    pub default_hour: u32,

    /// Maximum reminders per event.
    pub max_per_event: usize,
}

impl Default for ReminderSection {
    fn default() -> Self {
        Self {
            default_hour: DEFAULT_REMINDER_HOUR,
            max_per_event: MAX_REMINDERS_PER_EVENT,
        }
    }
}

/// `[view]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Length given to timed events that lose their end, in minutes.
    pub default_timed_duration_minutes: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            default_timed_duration_minutes: DEFAULT_TIMED_DURATION_MINUTES,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> SessionResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads and validates configuration from a specific path.
    pub fn load_from(path: &Path) -> SessionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SessionError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calsync")
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> SessionResult<()> {
        if self.reminders.default_hour > 23 {
            return Err(SessionError::Config(format!(
                "reminders.default_hour must be 0-23, got {}",
                self.reminders.default_hour
            )));
        }
        if self.reminders.max_per_event == 0 {
            return Err(SessionError::Config(
                "reminders.max_per_event must be at least 1".to_string(),
            ));
        }
        if self.store.timeout == 0 {
            return Err(SessionError::Config(
                "store.timeout must be at least 1 second".to_string(),
            ));
        }
        if self.view.default_timed_duration_minutes == 0 {
            return Err(SessionError::Config(
                "view.default_timed_duration_minutes must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.store.base_url).map_err(|e| {
            SessionError::Config(format!("invalid store.base_url {:?}: {}", self.store.base_url, e))
        })?;
        self.logging
            .format
            .parse::<LogFormat>()
            .map_err(SessionError::Config)?;
        self.time_zone()?;
        Ok(())
    }

    /// The configured zone, or `None` for the system local zone.
    pub fn time_zone(&self) -> SessionResult<Option<chrono_tz::Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<chrono_tz::Tz>()
                    .map_err(|_| SessionError::Config(format!("unknown time zone {:?}", name)))
            })
            .transpose()
    }

    /// Returns the `[reminders]` settings.
    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings::default()
            .with_default_hour(self.reminders.default_hour)
            .with_max_per_event(self.reminders.max_per_event)
    }

    /// Returns the `[view]` default timed duration.
    pub fn default_timed_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.view.default_timed_duration_minutes))
    }

    /// Returns the `[store]` request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout)
    }

    /// Subscriber settings for [`calsync_core::init_tracing`].
    pub fn tracing_config(&self) -> TracingConfig {
        let config = if self.debug {
            TracingConfig::debug()
        } else {
            TracingConfig::default()
        };
        config.with_format(self.logging.format.parse().unwrap_or_default())
    }

    /// Converts to the REST store configuration.
    #[cfg(feature = "http")]
    pub fn http_config(&self) -> SessionResult<calsync_stores::http::HttpStoreConfig> {
        let config = calsync_stores::http::HttpStoreConfig::new(&self.store.base_url)
            .map_err(|e| SessionError::Config(format!("invalid store.base_url: {}", e)))?;
        Ok(config.with_timeout(self.timeout()))
    }
}
