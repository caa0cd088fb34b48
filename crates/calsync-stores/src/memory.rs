//! In-process store holding events and reminders in memory.
//!
//! Implements both store traits with the same observable rules as the REST
//! store (ids assigned on create, partial bulk creates, not-found reporting
//! on bulk deletes). Individual operations can be made to fail, and every
//! call is recorded, which is what the session tests rely on.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use calsync_core::{
    EventId, PersistedReminder, ReminderId, ReminderPayload, TimeWindow, Trigger,
};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{BoxFuture, EventFilters, EventStore, ReminderStore};
use crate::wire::{
    BulkCreateResult, BulkDeleteResult, Category, EventUpdate, NewReminder, ReminderRecord,
    StoredEvent,
};

/// A store operation, as recorded and as targeted by failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ListEvents,
    GetEvent,
    UpdateEvent,
    ListCategories,
    ListReminders,
    CreateReminders,
    UpdateReminder,
    DeleteReminders,
}

#[derive(Debug, Default)]
struct Inner {
    events: BTreeMap<EventId, StoredEvent>,
    categories: Vec<Category>,
    reminders: BTreeMap<ReminderId, PersistedReminder>,
    next_reminder_id: ReminderId,
    failing: HashSet<StoreOperation>,
    failing_reminder_updates: HashSet<ReminderId>,
    calls: Vec<StoreOperation>,
}

/// Event and reminder store backed by in-memory maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds an event.
    #[must_use]
    pub fn with_event(self, event: StoredEvent) -> Self {
        self.lock().events.insert(event.id, event);
        self
    }

    /// Builder: adds a category.
    #[must_use]
    pub fn with_category(self, category: Category) -> Self {
        self.lock().categories.push(category);
        self
    }

    /// Builder: adds a reminder, keeping its id.
    #[must_use]
    pub fn with_reminder(self, reminder: PersistedReminder) -> Self {
        {
            let mut inner = self.lock();
            inner.next_reminder_id = inner.next_reminder_id.max(reminder.id);
            inner.reminders.insert(reminder.id, reminder);
        }
        self
    }

    /// Makes every later call of `operation` fail with a server error.
    pub fn fail(&self, operation: StoreOperation) {
        self.lock().failing.insert(operation);
    }

    /// Undoes [`fail`](Self::fail).
    pub fn recover(&self, operation: StoreOperation) {
        self.lock().failing.remove(&operation);
    }

    /// Makes updates of one reminder fail while others succeed.
    pub fn fail_reminder_update(&self, id: ReminderId) {
        self.lock().failing_reminder_updates.insert(id);
    }

    /// Operations called so far, in call order.
    pub fn calls(&self) -> Vec<StoreOperation> {
        self.lock().calls.clone()
    }

    /// Returns an event as currently stored.
    pub fn event(&self, id: EventId) -> Option<StoredEvent> {
        self.lock().events.get(&id).cloned()
    }

    /// Reminders of an event, ordered by id.
    pub fn reminders_for(&self, event_id: EventId) -> Vec<PersistedReminder> {
        self.lock()
            .reminders
            .values()
            .filter(|reminder| reminder.event_id == event_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the call and checks for an injected failure.
    fn enter(&self, operation: StoreOperation) -> StoreResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        inner.calls.push(operation);
        if inner.failing.contains(&operation) {
            debug!(?operation, "injected failure");
            return Err(StoreError::server(format!("{:?} failed", operation)).with_store("memory"));
        }
        Ok(inner)
    }
}

fn ready<'a, T: Send + 'a>(result: StoreResult<T>) -> BoxFuture<'a, StoreResult<T>> {
    Box::pin(async move { result })
}

fn matches_filters(event: &StoredEvent, filters: &EventFilters) -> bool {
    if let Some(category_id) = filters.category_id {
        if !event.categories.iter().any(|category| category.id == category_id) {
            return false;
        }
    }
    if let Some(search) = &filters.search {
        let needle = search.to_lowercase();
        let in_title = event.title.to_lowercase().contains(&needle);
        let in_description = event
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle));
        if !in_title && !in_description {
            return false;
        }
    }
    true
}

fn apply_payload(reminder: &mut PersistedReminder, payload: ReminderPayload) {
    match payload.trigger {
        Trigger::Relative { minutes_before } => {
            reminder.is_relative = true;
            reminder.minutes_before = Some(i64::from(minutes_before));
            reminder.reminder_time = None;
        }
        Trigger::Absolute { reminder_time } => {
            reminder.is_relative = false;
            reminder.minutes_before = None;
            reminder.reminder_time = Some(reminder_time);
        }
    }
    reminder.notification_type = payload.notification_type;
}

impl EventStore for MemoryStore {
    fn list_events(
        &self,
        window: TimeWindow,
        filters: EventFilters,
    ) -> BoxFuture<'_, StoreResult<Vec<StoredEvent>>> {
        let result = self.enter(StoreOperation::ListEvents).map(|inner| {
            inner
                .events
                .values()
                .filter(|event| window.contains(event.start_datetime))
                .filter(|event| matches_filters(event, &filters))
                .cloned()
                .collect()
        });
        ready(result)
    }

    fn get_event(&self, id: EventId) -> BoxFuture<'_, StoreResult<StoredEvent>> {
        let result = self.enter(StoreOperation::GetEvent).and_then(|inner| {
            inner
                .events
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("Event not found"))
        });
        ready(result)
    }

    fn update_event(&self, id: EventId, update: EventUpdate) -> BoxFuture<'_, StoreResult<()>> {
        let result = self.enter(StoreOperation::UpdateEvent).and_then(|mut inner| {
            let event = inner
                .events
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("Event not found"))?;
            event.start_datetime = update.start_datetime;
            event.end_datetime = Some(update.end_datetime);
            event.is_all_day = update.is_all_day;
            Ok(())
        });
        ready(result)
    }

    fn list_categories(&self) -> BoxFuture<'_, StoreResult<Vec<Category>>> {
        let result = self
            .enter(StoreOperation::ListCategories)
            .map(|inner| inner.categories.clone());
        ready(result)
    }
}

impl ReminderStore for MemoryStore {
    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> BoxFuture<'_, StoreResult<Vec<PersistedReminder>>> {
        let result = self.enter(StoreOperation::ListReminders).map(|inner| {
            inner
                .reminders
                .values()
                .filter(|reminder| reminder.event_id == event_id)
                .cloned()
                .collect()
        });
        ready(result)
    }

    fn create_bulk(
        &self,
        reminders: Vec<NewReminder>,
    ) -> BoxFuture<'_, StoreResult<BulkCreateResult>> {
        let result = self.enter(StoreOperation::CreateReminders).map(|mut inner| {
            let mut outcome = BulkCreateResult::default();
            for (index, new) in reminders.into_iter().enumerate() {
                if !inner.events.contains_key(&new.event_id) {
                    outcome
                        .errors
                        .push(format!("Reminder {}: Invalid or unauthorized event", index + 1));
                    continue;
                }
                inner.next_reminder_id += 1;
                let id = inner.next_reminder_id;
                let mut reminder = PersistedReminder::relative(id, new.event_id, 0);
                apply_payload(&mut reminder, new.payload);
                outcome.reminders.push(ReminderRecord {
                    id,
                    event_id: reminder.event_id,
                    reminder_time: reminder.reminder_time,
                    minutes_before: reminder.minutes_before,
                    is_relative: Some(reminder.is_relative),
                    notification_type: Some(reminder.notification_type.to_string()),
                    notification_sent: false,
                });
                inner.reminders.insert(id, reminder);
                outcome.created_count += 1;
            }
            outcome
        });
        ready(result)
    }

    fn update_reminder(
        &self,
        id: ReminderId,
        payload: ReminderPayload,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let result = self.enter(StoreOperation::UpdateReminder).and_then(|mut inner| {
            if inner.failing_reminder_updates.contains(&id) {
                return Err(StoreError::server(format!("update of reminder {} failed", id)));
            }
            let reminder = inner
                .reminders
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("Reminder not found"))?;
            apply_payload(reminder, payload);
            Ok(())
        });
        ready(result)
    }

    fn delete_bulk(&self, ids: Vec<ReminderId>) -> BoxFuture<'_, StoreResult<BulkDeleteResult>> {
        let result = self.enter(StoreOperation::DeleteReminders).and_then(|mut inner| {
            let mut outcome = BulkDeleteResult::default();
            for id in ids {
                if inner.reminders.remove(&id).is_some() {
                    outcome.deleted_ids.push(id);
                } else {
                    outcome.not_found_ids.push(id);
                }
            }
            outcome.deleted_count = outcome.deleted_ids.len();
            if outcome.deleted_count == 0 {
                return Err(StoreError::not_found("No reminders found to delete"));
            }
            Ok(outcome)
        });
        ready(result)
    }
}
