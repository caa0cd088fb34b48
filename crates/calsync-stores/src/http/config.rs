//! REST store configuration.

use std::time::Duration;

use url::Url;

use crate::error::{StoreError, StoreResult};

/// Configuration for the REST event and reminder stores.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub base_url: Url,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl HttpStoreConfig {
    /// Default API root of a local store server.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000/api";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calsync/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the URL of an endpoint below the API root.
    ///
    /// The root's own path is kept: `events/3` below `http://host/api`
    /// is `http://host/api/events/3`.
    pub fn endpoint(&self, path: &str) -> StoreResult<Url> {
        let root = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", root, path)).map_err(|e| {
            StoreError::configuration(format!("invalid endpoint {}: {}", path, e)).with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_api_prefix() {
        let config = HttpStoreConfig::new("http://localhost:5000/api").unwrap();
        assert_eq!(
            config.endpoint("reminders/bulk").unwrap().as_str(),
            "http://localhost:5000/api/reminders/bulk"
        );

        let slashed = HttpStoreConfig::new("https://cal.example.com/api/").unwrap();
        assert_eq!(
            slashed.endpoint("/events/3").unwrap().as_str(),
            "https://cal.example.com/api/events/3"
        );
    }

    #[test]
    fn defaults() {
        let config = HttpStoreConfig::new(HttpStoreConfig::DEFAULT_BASE_URL).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("calsync/"));
    }

    #[test]
    fn builder_methods() {
        let config = HttpStoreConfig::new("http://localhost:5000/api")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test/1.0");
    }
}
