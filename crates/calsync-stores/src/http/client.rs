//! Low-level JSON client for the REST store.
//!
//! Handles authentication, request building, and mapping of HTTP failures
//! to [`StoreError`]s. Response bodies are returned as raw JSON; decoding
//! into wire types is left to the envelope functions.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::config::HttpStoreConfig;
use crate::auth::AuthSession;
use crate::envelope;
use crate::error::{StoreError, StoreErrorCode, StoreResult};

/// JSON client bound to one API root and one auth session.
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: reqwest::Client,
    config: HttpStoreConfig,
    auth: Arc<AuthSession>,
}

impl RestClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: HttpStoreConfig, auth: Arc<AuthSession>) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                StoreError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
            auth,
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    /// Returns the auth session requests are signed with.
    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    /// Sends a GET request with query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> StoreResult<Value> {
        let request = self.request(reqwest::Method::GET, path)?.query(query);
        self.execute(request, path).await
    }

    /// Sends a request with a JSON body.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> StoreResult<Value> {
        let request = self.request(method, path)?.json(body);
        self.execute(request, path).await
    }

    /// Builds an authenticated request. Fails before any network call when
    /// the session has no token.
    fn request(&self, method: reqwest::Method, path: &str) -> StoreResult<reqwest::RequestBuilder> {
        let token = self.auth.require_token()?;
        let url = self.config.endpoint(path)?;
        Ok(self.http_client.request(method, url).bearer_auth(token))
    }

    async fn execute(&self, request: reqwest::RequestBuilder, path: &str) -> StoreResult<Value> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            StoreError::network(message).with_source(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            StoreError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        if let Some(error) = status_error(status.as_u16(), &body) {
            error!(path, status = status.as_u16(), code = %error.code(), "store request failed");
            return Err(error);
        }

        debug!(path, status = status.as_u16(), bytes = body.len(), "store response");
        parse_body(&body)
    }
}

/// Maps a failed HTTP status to an error, using the envelope message when
/// the body carries one.
pub fn status_error(status: u16, body: &str) -> Option<StoreError> {
    let code = StoreErrorCode::from_status(status)?;
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(envelope::message)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));
    Some(StoreError::new(code, message))
}

/// Parses a success body. An empty body is `null`.
pub fn parse_body(body: &str) -> StoreResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        StoreError::invalid_response(format!("response is not JSON: {}", e)).with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_uses_envelope_message() {
        let err = status_error(404, r#"{"success": false, "message": "Event not found"}"#).unwrap();
        assert_eq!(err.code(), StoreErrorCode::NotFound);
        assert_eq!(err.message(), "Event not found");
    }

    #[test]
    fn status_error_without_body() {
        let err = status_error(502, "<html>Bad Gateway</html>").unwrap();
        assert_eq!(err.code(), StoreErrorCode::ServerError);
        assert_eq!(err.message(), "HTTP 502");
        assert!(err.is_retryable());

        assert!(status_error(201, "").is_none());
    }

    #[test]
    fn parse_body_shapes() {
        assert_eq!(parse_body("").unwrap(), Value::Null);
        assert_eq!(parse_body(r#"{"success": true}"#).unwrap()["success"], true);
        assert_eq!(
            parse_body("not json").unwrap_err().code(),
            StoreErrorCode::InvalidResponse
        );
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let config = HttpStoreConfig::new("http://127.0.0.1:9/api").unwrap();
        let client = RestClient::new(config, Arc::new(AuthSession::new())).unwrap();
        let err = client.get("events", &[]).await.unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::AuthenticationFailed);
    }
}
