//! Reminder computation: presets, resolution to canonical triggers, preset
//! detection, duplicate rules and diffs against the persisted set.

pub mod context;
pub mod detect;
pub mod diff;
pub mod model;
pub mod preset;
pub mod resolve;
pub mod rules;

pub use context::ReminderContext;
pub use detect::{DEFAULT_ALL_DAY_PRESET, DEFAULT_TIMED_PRESET, default_spec, detect};
pub use diff::{ReminderDiff, ReminderUpdate, diff_reminders};
pub use model::{
    EventId, NotificationType, PersistedReminder, ReminderFormValue, ReminderId, ReminderMode,
    ReminderPayload, ReminderSpec, Trigger,
};
pub use preset::{AllDayPreset, Preset, TimedPreset};
pub use resolve::{resolve, resolve_trigger};
pub use rules::ReminderRules;
