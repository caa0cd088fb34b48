//! Minimal store operations between a loaded reminder set and an edited one.
//!
//! The diff is computed against the snapshot taken when the edit session
//! opened. Applying it is the caller's job, in the order deletes, creates,
//! updates.

use std::collections::{HashMap, HashSet};

use chrono::TimeZone;
use serde::Serialize;
use tracing::{debug, warn};

use super::context::ReminderContext;
use super::detect::detect_all_day_offset;
use super::model::{
    PersistedReminder, ReminderFormValue, ReminderId, ReminderPayload, ReminderSpec, Trigger,
};
use super::preset::Preset;
use super::resolve::resolve;

/// A changed reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderUpdate {
    pub id: ReminderId,
    #[serde(flatten)]
    pub payload: ReminderPayload,
}

/// Store operations that turn the persisted set into the edited set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderDiff {
    pub creates: Vec<ReminderPayload>,
    pub updates: Vec<ReminderUpdate>,
    pub deletes: Vec<ReminderId>,
}

impl ReminderDiff {
    /// Returns true when nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of store operations.
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }
}

/// Computes the diff between `persisted` and `edited`.
///
/// An all-day preset left on a record written with another offset for the
/// same preset (the fixed table value instead of the calendar one) counts as
/// unchanged.
///
/// An edited entry whose id is not in the persisted set (it was deleted
/// elsewhere since the snapshot), or repeats an id already seen, is created
/// anew.
pub fn diff_reminders<Tz: TimeZone>(
    persisted: &[PersistedReminder],
    edited: &[ReminderFormValue],
    ctx: &ReminderContext<Tz>,
) -> ReminderDiff {
    let by_id: HashMap<ReminderId, &PersistedReminder> =
        persisted.iter().map(|reminder| (reminder.id, reminder)).collect();
    let mut kept = HashSet::new();
    let mut diff = ReminderDiff::default();

    for value in edited {
        let payload = resolve(value, ctx);
        let existing = value
            .id
            .and_then(|id| by_id.get(&id).copied().filter(|_| kept.insert(id)));

        match (value.id, existing) {
            (_, Some(reminder)) => {
                if !payload.matches(reminder) && !is_same_all_day_preset(value, reminder, ctx) {
                    diff.updates.push(ReminderUpdate {
                        id: reminder.id,
                        payload,
                    });
                }
            }
            (Some(id), None) => {
                warn!(id, "edited reminder not in snapshot, creating it");
                diff.creates.push(payload);
            }
            (None, None) => diff.creates.push(payload),
        }
    }

    diff.deletes = persisted
        .iter()
        .map(|reminder| reminder.id)
        .filter(|id| !kept.contains(id))
        .collect();

    debug!(
        creates = diff.creates.len(),
        updates = diff.updates.len(),
        deletes = diff.deletes.len(),
        "computed reminder diff"
    );
    diff
}

fn is_same_all_day_preset<Tz: TimeZone>(
    value: &ReminderFormValue,
    reminder: &PersistedReminder,
    ctx: &ReminderContext<Tz>,
) -> bool {
    let ReminderSpec::Preset(Preset::AllDay(preset)) = value.spec else {
        return false;
    };
    let Some(Trigger::Relative { minutes_before }) = reminder.trigger() else {
        return false;
    };
    ctx.is_all_day
        && value.notification_type == reminder.notification_type
        && detect_all_day_offset(minutes_before, ctx) == Some(preset)
}
