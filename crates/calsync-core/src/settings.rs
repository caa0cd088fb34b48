//! Reminder settings shared by the resolver, detector and duplicate rules.

use serde::{Deserialize, Serialize};

/// Maximum number of reminders attached to a single event.
pub const MAX_REMINDERS_PER_EVENT: usize = 3;

/// Local hour at which all-day presets fire.
pub const DEFAULT_REMINDER_HOUR: u32 = 9;

/// Tunables for reminder computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    /// Local hour (0-23) that all-day presets are anchored at.
    pub default_hour: u32,
    /// Maximum number of reminders per event.
    pub max_per_event: usize,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            default_hour: DEFAULT_REMINDER_HOUR,
            max_per_event: MAX_REMINDERS_PER_EVENT,
        }
    }
}

impl ReminderSettings {
    /// Builder: set the anchor hour for all-day presets.
    #[must_use]
    pub fn with_default_hour(mut self, hour: u32) -> Self {
        self.default_hour = hour.min(23);
        self
    }

    /// Builder: set the per-event reminder cap.
    #[must_use]
    pub fn with_max_per_event(mut self, max: usize) -> Self {
        self.max_per_event = max;
        self
    }

    /// Fixed minutes between local midnight of the event day and the anchor
    /// hour `days` days earlier, ignoring DST.
    pub fn fixed_offset_minutes(&self, days: u32) -> u32 {
        (days * 24 * 60).saturating_sub(self.default_hour * 60)
    }
}
