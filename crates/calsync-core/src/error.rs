//! Validation errors raised while editing reminders.
//!
//! These are handled locally: no store call is made when one is returned,
//! and the `Display` text is meant to be shown inline to the user.

use thiserror::Error;

/// Result type for reminder validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A reminder edit that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Another reminder already resolves to the same trigger.
    #[error("A reminder for this time already exists")]
    Duplicate {
        /// Canonical key shared by both reminders.
        key: String,
    },

    /// The per-event reminder cap would be exceeded.
    #[error("An event can have at most {max} reminders")]
    TooMany { max: usize },

    /// A relative reminder would fire after the event starts.
    #[error("A reminder cannot fire after the event starts")]
    TriggerAfterStart,

    /// An edit referenced a reminder slot that does not exist.
    #[error("No reminder at position {index}")]
    NoSuchEntry { index: usize },
}
