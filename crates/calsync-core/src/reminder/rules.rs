//! Duplicate detection, the per-event cap and reminder suggestions.
//!
//! Two reminders are the same if they resolve to the same canonical key,
//! whatever their delivery channel. Timed events compare relative minutes;
//! all-day events compare the resolved trigger instant, so a preset and a
//! custom time that land on the same instant collide.

use std::collections::HashSet;

use chrono::{SecondsFormat, TimeZone};
use tracing::debug;

use crate::error::{ValidationError, ValidationResult};

use super::context::ReminderContext;
use super::model::{ReminderFormValue, ReminderSpec, Trigger};
use super::preset::{AllDayPreset, Preset, TimedPreset};
use super::resolve::resolve_trigger;

/// Suggestion order for timed events.
pub const TIMED_SUGGESTIONS: [TimedPreset; 6] = [
    TimedPreset::Min15,
    TimedPreset::Min30,
    TimedPreset::Hr1,
    TimedPreset::Min10,
    TimedPreset::Min5,
    TimedPreset::AtStart,
];

/// Suggestion order for all-day events.
pub const ALL_DAY_SUGGESTIONS: [AllDayPreset; 4] = [
    AllDayPreset::Day1Before9am,
    AllDayPreset::SameDay9am,
    AllDayPreset::Day2Before9am,
    AllDayPreset::Week1Before9am,
];

/// Validation rules for the reminders of one event.
#[derive(Debug, Clone)]
pub struct ReminderRules<Tz: TimeZone> {
    ctx: ReminderContext<Tz>,
}

impl<Tz: TimeZone> ReminderRules<Tz> {
    /// Creates rules for one event's context.
    pub fn new(ctx: ReminderContext<Tz>) -> Self {
        Self { ctx }
    }

    /// Returns the context the rules check against.
    pub fn context(&self) -> &ReminderContext<Tz> {
        &self.ctx
    }

    /// Canonical comparison key of a reminder.
    pub fn key(&self, value: &ReminderFormValue) -> String {
        let trigger = resolve_trigger(&value.spec, &self.ctx);
        if self.ctx.is_all_day {
            let at = trigger.fire_time(self.ctx.event_start);
            format!("abs::{}", at.to_rfc3339_opts(SecondsFormat::Millis, true))
        } else {
            match trigger {
                Trigger::Relative { minutes_before } => format!("rel::{}", minutes_before),
                Trigger::Absolute { reminder_time } => format!(
                    "abs::{}",
                    reminder_time.to_rfc3339_opts(SecondsFormat::Millis, true)
                ),
            }
        }
    }

    /// Returns true when `candidate` collides with any entry of `list`.
    pub fn is_duplicate(&self, list: &[ReminderFormValue], candidate: &ReminderFormValue) -> bool {
        let key = self.key(candidate);
        list.iter().any(|existing| self.key(existing) == key)
    }

    /// Checks that a reminder never fires after the event starts.
    ///
    /// A negative minute count, or a custom time after the start of a timed
    /// event, would give such a trigger. Absolute reminders on all-day
    /// events are allowed to fire during the day.
    pub fn check_trigger(&self, value: &ReminderFormValue) -> ValidationResult<()> {
        match value.spec {
            ReminderSpec::CustomMinutes(minutes) if minutes < 0 => {
                Err(ValidationError::TriggerAfterStart)
            }
            ReminderSpec::CustomDateTime(at) if !self.ctx.is_all_day && at > self.ctx.event_start => {
                Err(ValidationError::TriggerAfterStart)
            }
            _ => Ok(()),
        }
    }

    /// Validates adding `candidate` to `list`.
    pub fn check_addition(
        &self,
        list: &[ReminderFormValue],
        candidate: &ReminderFormValue,
    ) -> ValidationResult<()> {
        let max = self.ctx.settings.max_per_event;
        if list.len() >= max {
            return Err(ValidationError::TooMany { max });
        }
        self.check_trigger(candidate)?;
        self.check_unique(list.iter(), candidate)
    }

    /// Validates replacing the entry at `index` with `candidate`.
    ///
    /// The replaced entry is not compared against its replacement.
    pub fn check_replacement(
        &self,
        list: &[ReminderFormValue],
        index: usize,
        candidate: &ReminderFormValue,
    ) -> ValidationResult<()> {
        if index >= list.len() {
            return Err(ValidationError::NoSuchEntry { index });
        }
        self.check_trigger(candidate)?;
        let others = list
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, value)| value);
        self.check_unique(others, candidate)
    }

    /// Validates a whole list before it is synced.
    pub fn check_all(&self, list: &[ReminderFormValue]) -> ValidationResult<()> {
        let max = self.ctx.settings.max_per_event;
        if list.len() > max {
            return Err(ValidationError::TooMany { max });
        }
        let mut seen = HashSet::new();
        for value in list {
            self.check_trigger(value)?;
            let key = self.key(value);
            if !seen.insert(key.clone()) {
                return Err(ValidationError::Duplicate { key });
            }
        }
        Ok(())
    }

    /// Picks the first preset, in priority order, that is not already used.
    ///
    /// Returns `None` when the cap is reached or every candidate is taken.
    pub fn suggest_next(&self, list: &[ReminderFormValue]) -> Option<ReminderFormValue> {
        if list.len() >= self.ctx.settings.max_per_event {
            return None;
        }
        let taken: HashSet<String> = list.iter().map(|value| self.key(value)).collect();
        let suggestion = self
            .candidates()
            .into_iter()
            .map(ReminderFormValue::preset)
            .find(|value| !taken.contains(&self.key(value)));
        debug!(?suggestion, taken = taken.len(), "suggested reminder");
        suggestion
    }

    fn candidates(&self) -> Vec<Preset> {
        if self.ctx.is_all_day {
            ALL_DAY_SUGGESTIONS.iter().map(|p| Preset::from(*p)).collect()
        } else {
            TIMED_SUGGESTIONS.iter().map(|p| Preset::from(*p)).collect()
        }
    }

    fn check_unique<'a>(
        &self,
        others: impl Iterator<Item = &'a ReminderFormValue>,
        candidate: &ReminderFormValue,
    ) -> ValidationResult<()> {
        let key = self.key(candidate);
        for existing in others {
            if self.key(existing) == key {
                return Err(ValidationError::Duplicate { key });
            }
        }
        Ok(())
    }
}
