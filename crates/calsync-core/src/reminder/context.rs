//! The owning event as seen by the reminder logic.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::settings::ReminderSettings;
use crate::time::{day_at_hour, local_date, shift_date};

use super::preset::AllDayPreset;

/// Everything the resolver, detector and duplicate rules need to know about
/// the event a reminder belongs to.
///
/// This is passed explicitly; none of the reminder functions read global
/// state.
#[derive(Debug, Clone)]
pub struct ReminderContext<Tz: TimeZone> {
    /// Whether the owning event is all-day.
    pub is_all_day: bool,
    /// Event start. For all-day events this is local midnight of the first day.
    pub event_start: DateTime<Utc>,
    /// Zone used for local-day arithmetic.
    pub tz: Tz,
    /// Reminder tunables.
    pub settings: ReminderSettings,
}

impl<Tz: TimeZone> ReminderContext<Tz> {
    /// Context for a timed event.
    pub fn timed(event_start: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            is_all_day: false,
            event_start,
            tz,
            settings: ReminderSettings::default(),
        }
    }

    /// Context for an all-day event.
    pub fn all_day(event_start: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            is_all_day: true,
            event_start,
            tz,
            settings: ReminderSettings::default(),
        }
    }

    /// Builder: use specific settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ReminderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The event's local start date.
    pub fn event_date(&self) -> NaiveDate {
        local_date(&self.tz, self.event_start)
    }

    /// The instant an all-day preset targets: the anchor hour on the event
    /// day, shifted back by the preset's day count on the local calendar.
    pub fn preset_target(&self, preset: AllDayPreset) -> DateTime<Utc> {
        let day = shift_date(self.event_date(), -i64::from(preset.days_before()));
        day_at_hour(&self.tz, day, self.settings.default_hour)
    }

    /// Whole minutes from `earlier` to the event start, clamped at zero.
    pub fn minutes_until_start(&self, earlier: DateTime<Utc>) -> u32 {
        let minutes = (self.event_start - earlier).num_minutes().max(0);
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }
}
