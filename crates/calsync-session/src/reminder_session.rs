//! Editing the reminders of one event.
//!
//! The persisted reminders are read once when the session opens and kept as
//! the snapshot the edits are diffed against. Nothing is locked on the store
//! side: a concurrent edit elsewhere is overwritten on save.

use std::collections::HashSet;

use calsync_core::reminder::{detect, diff_reminders, resolve};
use calsync_core::{
    EventId, PersistedReminder, ReminderContext, ReminderDiff, ReminderFormValue, ReminderRules,
    ReminderSettings, TimeBoundaryConverter, ValidationError,
};
use calsync_stores::{ReminderStore, StoredEvent};
use chrono::TimeZone;
use tracing::{debug, warn};

use crate::error::SessionResult;
use crate::sync::{SyncReport, SyncStatus, apply_diff};

/// Reminder context of a stored event.
///
/// All-day events are anchored at local midnight of their first day.
pub fn event_context<Tz: TimeZone>(
    event: &StoredEvent,
    tz: Tz,
    settings: ReminderSettings,
) -> ReminderContext<Tz> {
    let ctx = if event.is_all_day {
        let start = TimeBoundaryConverter::new(tz.clone()).start_of_day(event.start_datetime);
        ReminderContext::all_day(start, tz)
    } else {
        ReminderContext::timed(event.start_datetime, tz)
    };
    ctx.with_settings(settings)
}

/// An open reminder editor for one event.
#[derive(Debug, Clone)]
pub struct ReminderEditSession<Tz: TimeZone> {
    event_id: EventId,
    rules: ReminderRules<Tz>,
    snapshot: Vec<PersistedReminder>,
    values: Vec<ReminderFormValue>,
}

impl<Tz: TimeZone> ReminderEditSession<Tz> {
    /// Reads the event's reminders and converts them to editable values.
    pub async fn open<S: ReminderStore + ?Sized>(
        store: &S,
        event_id: EventId,
        ctx: ReminderContext<Tz>,
    ) -> SessionResult<Self> {
        let snapshot = store.list_for_event(event_id).await?;
        let mut session = Self {
            event_id,
            rules: ReminderRules::new(ctx),
            snapshot: Vec::new(),
            values: Vec::new(),
        };
        session.reset_to(snapshot);
        debug!(event_id, count = session.values.len(), "opened reminder session");
        Ok(session)
    }

    fn reset_to(&mut self, snapshot: Vec<PersistedReminder>) {
        let ctx = self.rules.context();
        self.values = snapshot.iter().map(|reminder| detect(reminder, ctx)).collect();
        self.snapshot = snapshot;
    }

    /// Returns the id of the edited event.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the reminder context of the edited event.
    pub fn context(&self) -> &ReminderContext<Tz> {
        self.rules.context()
    }

    /// Reminders as last read from the store.
    pub fn snapshot(&self) -> &[PersistedReminder] {
        &self.snapshot
    }

    /// Current editable values.
    pub fn values(&self) -> &[ReminderFormValue] {
        &self.values
    }

    /// True when the cap is reached.
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.context().settings.max_per_event
    }

    /// Store operations a save would issue now.
    pub fn pending_diff(&self) -> ReminderDiff {
        diff_reminders(&self.snapshot, &self.values, self.context())
    }

    /// Returns true when a save would write something.
    pub fn is_dirty(&self) -> bool {
        !self.pending_diff().is_empty()
    }

    /// Appends a reminder.
    pub fn add(&mut self, value: ReminderFormValue) -> SessionResult<()> {
        self.rules.check_addition(&self.values, &value)?;
        self.values.push(value);
        Ok(())
    }

    /// Appends the first free suggested preset, if any.
    pub fn add_suggested(&mut self) -> Option<&ReminderFormValue> {
        let value = self.rules.suggest_next(&self.values)?;
        self.values.push(value);
        self.values.last()
    }

    /// Replaces the entry at `index`. The entry keeps its store id unless
    /// `value` carries one.
    pub fn replace(&mut self, index: usize, value: ReminderFormValue) -> SessionResult<()> {
        self.rules.check_replacement(&self.values, index, &value)?;
        let id = value.id.or(self.values[index].id);
        self.values[index] = ReminderFormValue { id, ..value };
        Ok(())
    }

    /// Removes the entry at `index`.
    pub fn remove(&mut self, index: usize) -> SessionResult<ReminderFormValue> {
        if index >= self.values.len() {
            return Err(ValidationError::NoSuchEntry { index }.into());
        }
        Ok(self.values.remove(index))
    }

    /// Validates, writes the diff, and rereads the event's reminders.
    ///
    /// Phase failures are reported in the [`SyncReport`], not as an error.
    /// After a complete save the values are rebuilt from the reread. After a
    /// partial or failed one the edits are kept, so saving again retries
    /// what did not land. If the reread fails the old snapshot is kept.
    pub async fn save<S: ReminderStore + ?Sized>(&mut self, store: &S) -> SessionResult<SyncReport> {
        self.rules.check_all(&self.values)?;
        let diff = self.pending_diff();
        let report = apply_diff(store, self.event_id, &diff).await;
        if diff.is_empty() {
            return Ok(report);
        }

        match store.list_for_event(self.event_id).await {
            Ok(snapshot) if report.status() == SyncStatus::Complete => self.reset_to(snapshot),
            Ok(snapshot) => self.rebase(snapshot),
            Err(err) => warn!(event_id = self.event_id, error = %err, "could not reread reminders after save"),
        }
        Ok(report)
    }

    /// Moves the edited values onto a new snapshot.
    ///
    /// Values keep their id while the record still exists. A new value takes
    /// the id of a record that was created for it, and a value whose record
    /// is gone loses its id so it is created again.
    fn rebase(&mut self, snapshot: Vec<PersistedReminder>) {
        let ctx = self.rules.context();
        let mut claimed: HashSet<_> = self
            .values
            .iter()
            .filter_map(|value| value.id)
            .filter(|id| snapshot.iter().any(|reminder| reminder.id == *id))
            .collect();

        for value in &mut self.values {
            match value.id {
                Some(id) if snapshot.iter().any(|reminder| reminder.id == id) => {}
                _ => {
                    let payload = resolve(value, ctx);
                    value.id = snapshot
                        .iter()
                        .find(|reminder| !claimed.contains(&reminder.id) && payload.matches(reminder))
                        .map(|reminder| reminder.id);
                    claimed.extend(value.id);
                }
            }
        }

        self.snapshot = snapshot;
        debug!(
            event_id = self.event_id,
            pending = self.pending_diff().len(),
            "kept unsaved reminder edits"
        );
    }
}
