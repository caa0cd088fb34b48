//! Core types: all-day boundaries, reminder presets and triggers, duplicate
//! rules, reminder diffs

pub mod error;
pub mod reminder;
pub mod settings;
pub mod time;
pub mod tracing;

pub use error::{ValidationError, ValidationResult};
pub use reminder::{
    AllDayPreset, EventId, NotificationType, PersistedReminder, Preset, ReminderContext,
    ReminderDiff, ReminderFormValue, ReminderId, ReminderPayload, ReminderRules, ReminderSpec,
    ReminderUpdate, TimedPreset, Trigger,
};
pub use settings::{DEFAULT_REMINDER_HOUR, MAX_REMINDERS_PER_EVENT, ReminderSettings};
pub use time::{CalendarRange, TimeBoundaryConverter, TimeWindow};
pub use self::tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
