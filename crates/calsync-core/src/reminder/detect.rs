//! Recovers the editable form of a persisted reminder.
//!
//! This is the inverse of [`resolve`](super::resolve::resolve): a reminder
//! that was created from a preset comes back as that preset, anything else
//! comes back as a custom value. Records with no usable trigger fall back to
//! the default preset for the event kind.
//!
//! Relative all-day offsets are accepted both as the fixed table values
//! (what older records hold) and as the DST-aware values the resolver
//! computes today, so neither kind of record is shown as custom.

use chrono::{Duration, TimeZone, Timelike};
use tracing::debug;

use super::context::ReminderContext;
use super::model::{PersistedReminder, ReminderFormValue, ReminderSpec, Trigger};
use super::preset::{AllDayPreset, Preset, TimedPreset};
use super::resolve::resolve_all_day_preset;

/// Default preset for timed events.
pub const DEFAULT_TIMED_PRESET: TimedPreset = TimedPreset::AtStart;

/// Default preset for all-day events.
pub const DEFAULT_ALL_DAY_PRESET: AllDayPreset = AllDayPreset::Day1Before9am;

/// Returns the fallback spec for an event kind.
pub fn default_spec(is_all_day: bool) -> ReminderSpec {
    if is_all_day {
        ReminderSpec::Preset(Preset::AllDay(DEFAULT_ALL_DAY_PRESET))
    } else {
        ReminderSpec::Preset(Preset::Timed(DEFAULT_TIMED_PRESET))
    }
}

/// Converts a persisted reminder into an editable value, keeping its id and
/// delivery channel.
pub fn detect<Tz: TimeZone>(
    reminder: &PersistedReminder,
    ctx: &ReminderContext<Tz>,
) -> ReminderFormValue {
    let spec = match (reminder.trigger(), ctx.is_all_day) {
        (Some(Trigger::Relative { minutes_before }), false) => TimedPreset::from_minutes(minutes_before)
            .map(|preset| ReminderSpec::Preset(preset.into()))
            .unwrap_or(ReminderSpec::CustomMinutes(i64::from(minutes_before))),
        (Some(Trigger::Relative { minutes_before }), true) => {
            match detect_all_day_offset(minutes_before, ctx) {
                Some(preset) => ReminderSpec::Preset(preset.into()),
                None => ReminderSpec::CustomDateTime(
                    ctx.event_start - Duration::minutes(i64::from(minutes_before)),
                ),
            }
        }
        (Some(Trigger::Absolute { reminder_time }), true) => {
            match detect_all_day_absolute(reminder_time, ctx) {
                Some(preset) => ReminderSpec::Preset(preset.into()),
                None => ReminderSpec::CustomDateTime(reminder_time),
            }
        }
        (shape, all_day) => {
            debug!(id = reminder.id, ?shape, all_day, "unrecognized reminder shape, using default");
            default_spec(ctx.is_all_day)
        }
    };

    ReminderFormValue::new(spec)
        .with_id(reminder.id)
        .with_notification_type(reminder.notification_type)
}

/// Reverse lookup of a relative all-day offset.
///
/// The same-day preset is never relative, so it is not a candidate here.
pub fn detect_all_day_offset<Tz: TimeZone>(
    minutes_before: u32,
    ctx: &ReminderContext<Tz>,
) -> Option<AllDayPreset> {
    AllDayPreset::ALL
        .into_iter()
        .filter(|preset| !preset.is_same_day())
        .find(|preset| {
            let fixed = ctx.settings.fixed_offset_minutes(preset.days_before());
            let computed = match resolve_all_day_preset(*preset, ctx) {
                Trigger::Relative { minutes_before } => Some(minutes_before),
                Trigger::Absolute { .. } => None,
            };
            minutes_before == fixed || computed == Some(minutes_before)
        })
}

/// Reverse lookup of an absolute all-day reminder.
///
/// Only a reminder exactly on the anchor hour (minute and second zero, in
/// local time) whose day difference to the event matches a preset is
/// recognized.
pub fn detect_all_day_absolute<Tz: TimeZone>(
    reminder_time: chrono::DateTime<chrono::Utc>,
    ctx: &ReminderContext<Tz>,
) -> Option<AllDayPreset> {
    let local = reminder_time.with_timezone(&ctx.tz);
    if local.hour() != ctx.settings.default_hour || local.minute() != 0 || local.second() != 0 {
        return None;
    }
    let days = (ctx.event_date() - local.date_naive()).num_days();
    AllDayPreset::from_days_before(days)
}
