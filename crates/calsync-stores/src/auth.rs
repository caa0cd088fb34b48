//! Explicit authentication state shared by the store clients.

use std::sync::RwLock;

use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Tokens obtained when the user signed in.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl AuthTokens {
    /// Creates tokens with only an access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The signed-in state of the client.
///
/// Created empty, filled by [`sign_in`](Self::sign_in) and emptied by
/// [`sign_out`](Self::sign_out). Stores hold it behind an `Arc`.
#[derive(Debug, Default)]
pub struct AuthSession {
    tokens: RwLock<Option<AuthTokens>>,
}

impl AuthSession {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that is already signed in.
    pub fn signed_in(tokens: AuthTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }

    /// Stores the tokens, replacing any previous ones.
    pub fn sign_in(&self, tokens: AuthTokens) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
        info!("signed in");
    }

    /// Drops the tokens.
    pub fn sign_out(&self) {
        let previous = self.tokens.write().unwrap_or_else(|e| e.into_inner()).take();
        debug!(was_signed_in = previous.is_some(), "signed out");
    }

    /// Returns true while tokens are held.
    pub fn is_signed_in(&self) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// The current access token, if signed in.
    pub fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }

    /// The current access token, or an authentication error.
    pub fn require_token(&self) -> StoreResult<String> {
        self.access_token()
            .ok_or_else(|| StoreError::authentication("not signed in"))
    }
}
