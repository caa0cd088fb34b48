//! Log output for applications embedding calsync.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! left to the host application, which can call [`init_tracing`] once at
//! startup:
//!
//! ```ignore
//! use calsync_core::tracing::{init_tracing, LogFormat, TracingConfig};
//!
//! init_tracing(TracingConfig::default().with_format(LogFormat::Json))?;
//! ```
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt as fmt_layer, prelude::*};

/// Crate targets covered by the default filter.
pub const LOG_TARGETS: [&str; 3] = ["calsync_core", "calsync_stores", "calsync_session"];

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the calsync crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: LogFormat,
    /// Include file and line of the call site.
    pub with_location: bool,
    pub with_timestamps: bool,
    /// Explicit filter directive, replacing both `RUST_LOG` and `level`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            with_location: false,
            with_timestamps: true,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Verbose settings for local debugging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
            with_location: true,
            with_timestamps: false,
            filter: None,
        }
    }

    /// Sets the default level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a filter directive, overriding `RUST_LOG`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The directive used when neither `filter` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.filter {
            Some(directive) => Ok(EnvFilter::try_new(directive)?),
            None => match EnvFilter::try_from_default_env() {
                Ok(filter) => Ok(filter),
                Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
            },
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a subscriber is already installed or the filter does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let layer = fmt_layer::layer()
        .with_file(config.with_location)
        .with_line_number(config.with_location);

    match (config.format, config.with_timestamps) {
        (LogFormat::Pretty, true) => registry.with(layer.pretty()).try_init()?,
        (LogFormat::Pretty, false) => registry.with(layer.pretty().without_time()).try_init()?,
        (LogFormat::Compact, true) => registry.with(layer.compact()).try_init()?,
        (LogFormat::Compact, false) => registry.with(layer.compact().without_time()).try_init()?,
        (LogFormat::Json, true) => registry.with(layer.json()).try_init()?,
        (LogFormat::Json, false) => registry.with(layer.json().without_time()).try_init()?,
    }

    Ok(())
}
