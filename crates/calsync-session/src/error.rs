//! Session error types.

use calsync_core::{EventId, ValidationError};
use calsync_stores::StoreError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced to the user by the calendar and reminder sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A reminder edit was rejected locally. No store call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A gesture targeted an event that is not in the view.
    #[error("event {0} is not in the current view")]
    UnknownEvent(EventId),
}

impl SessionError {
    /// Text for an inline message (validation) or a transient notification
    /// (everything else).
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Store(err) if err.is_retryable() => {
                "Could not reach the calendar service, please try again".to_string()
            }
            Self::Store(err) => format!("Could not save changes: {}", err.message()),
            Self::Config(msg) => format!("Invalid configuration: {}", msg),
            Self::UnknownEvent(_) => "This event is no longer displayed".to_string(),
        }
    }

    /// Returns true for errors raised before any store call.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config(_) | Self::UnknownEvent(_))
    }
}
