//! Client sessions over the calsync stores.
//!
//! - [`CalendarView`] - the visible window of events, in display form
//! - [`DragResizeReconciler`] - drag, resize and range-select with optimistic updates
//! - [`ReminderEditSession`] - editing one event's reminders, synced in phases
//! - [`ClientState`] - sign-in, categories and settings, passed explicitly
//! - [`ClientConfig`] - `config.toml`

pub mod config;
pub mod error;
pub mod reconciler;
pub mod reminder_session;
pub mod state;
pub mod sync;
pub mod view;

pub use config::ClientConfig;
pub use error::{SessionError, SessionResult};
pub use reconciler::{CommitOutcome, DragResizeReconciler, Gesture, NewEventDraft, PendingGesture};
pub use reminder_session::{ReminderEditSession, event_context};
pub use state::ClientState;
pub use sync::{PhaseOutcome, SyncPhase, SyncReport, SyncStatus, apply_diff};
pub use view::{CalendarView, DisplayEvent};
