//! Turns an editable reminder into its canonical persisted form.
//!
//! Timed events always get a relative trigger. All-day events get a relative
//! trigger whenever the reminder fires before the event's local midnight, so
//! it keeps tracking the event if its date moves; reminders firing on the day
//! itself (including the same-day preset) are stored as absolute instants.
//!
//! All-day preset offsets are computed with local calendar arithmetic at
//! write time, which makes them exact across DST transitions. Away from DST
//! they equal the fixed table (900 / 2340 / 9540 minutes at 9:00).

use chrono::TimeZone;
use tracing::trace;

use super::context::ReminderContext;
use super::model::{ReminderFormValue, ReminderPayload, ReminderSpec, Trigger};
use super::preset::{AllDayPreset, Preset};

/// Resolves a form value into the payload written to the reminder store.
pub fn resolve<Tz: TimeZone>(value: &ReminderFormValue, ctx: &ReminderContext<Tz>) -> ReminderPayload {
    ReminderPayload::new(resolve_trigger(&value.spec, ctx), value.notification_type)
}

/// Resolves a spec into a canonical trigger.
pub fn resolve_trigger<Tz: TimeZone>(spec: &ReminderSpec, ctx: &ReminderContext<Tz>) -> Trigger {
    let trigger = match spec {
        ReminderSpec::CustomMinutes(minutes) => {
            Trigger::relative(u32::try_from((*minutes).max(0)).unwrap_or(u32::MAX))
        }
        ReminderSpec::CustomDateTime(at) => {
            if ctx.is_all_day && *at >= ctx.event_start {
                Trigger::absolute(*at)
            } else {
                Trigger::relative(ctx.minutes_until_start(*at))
            }
        }
        ReminderSpec::Preset(Preset::Timed(preset)) => Trigger::relative(preset.minutes_before()),
        ReminderSpec::Preset(Preset::AllDay(preset)) => resolve_all_day_preset(*preset, ctx),
    };
    trace!(?spec, ?trigger, all_day = ctx.is_all_day, "resolved reminder");
    trigger
}

/// Resolves an anchored preset.
///
/// On an all-day event the same-day preset fires after the event's own
/// start, so it can only be stored as an absolute time. Everything else is
/// minutes before the start, clamped at zero.
pub fn resolve_all_day_preset<Tz: TimeZone>(
    preset: AllDayPreset,
    ctx: &ReminderContext<Tz>,
) -> Trigger {
    let target = ctx.preset_target(preset);
    if ctx.is_all_day && preset.is_same_day() {
        Trigger::absolute(target)
    } else {
        Trigger::relative(ctx.minutes_until_start(target))
    }
}
