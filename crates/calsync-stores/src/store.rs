//! Store traits.
//!
//! [`EventStore`] and [`ReminderStore`] are the two remote CRUD services the
//! client talks to. Every call is asynchronous; methods return boxed futures
//! so the traits stay object-safe and can be shared as `Arc<dyn ...>`.

use std::future::Future;
use std::pin::Pin;

use calsync_core::{EventId, PersistedReminder, ReminderId, ReminderPayload, TimeWindow};

use crate::error::{StoreError, StoreResult};
use crate::wire::{BulkCreateResult, BulkDeleteResult, Category, EventUpdate, NewReminder, StoredEvent};

/// A boxed future for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Filters applied when listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub category_id: Option<i64>,
    /// Matched against title and description by the store.
    pub search: Option<String>,
}

impl EventFilters {
    /// Creates filters that match everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one category.
    #[must_use]
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Sets the search text. Blank text clears it.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let trimmed = search.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Returns true when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.search.is_none()
    }
}

/// The event store.
///
/// All-day events are returned with an inclusive end instant; timestamps
/// are UTC.
pub trait EventStore: Send + Sync {
    /// Lists the events starting inside `window`.
    fn list_events(
        &self,
        window: TimeWindow,
        filters: EventFilters,
    ) -> BoxFuture<'_, StoreResult<Vec<StoredEvent>>>;

    fn get_event(&self, id: EventId) -> BoxFuture<'_, StoreResult<StoredEvent>>;

    /// Writes a new range (and optionally title) for an event.
    fn update_event(&self, id: EventId, update: EventUpdate) -> BoxFuture<'_, StoreResult<()>>;

    /// Lists the user's categories.
    fn list_categories(&self) -> BoxFuture<'_, StoreResult<Vec<Category>>>;
}

/// The reminder store.
pub trait ReminderStore: Send + Sync {
    fn list_for_event(&self, event_id: EventId)
    -> BoxFuture<'_, StoreResult<Vec<PersistedReminder>>>;

    /// Creates several reminders. The store may create only some of them;
    /// the result says how many.
    fn create_bulk(
        &self,
        reminders: Vec<NewReminder>,
    ) -> BoxFuture<'_, StoreResult<BulkCreateResult>>;

    fn update_reminder(
        &self,
        id: ReminderId,
        payload: ReminderPayload,
    ) -> BoxFuture<'_, StoreResult<()>>;

    fn delete_bulk(&self, ids: Vec<ReminderId>) -> BoxFuture<'_, StoreResult<BulkDeleteResult>>;
}

/// A store that fails every call with the same error.
///
/// Stands in for a store that could not be configured.
#[derive(Debug)]
pub struct ErrorStore {
    error: StoreError,
}

impl ErrorStore {
    /// Creates a store that fails every call with `error`.
    pub fn new(error: StoreError) -> Self {
        Self { error }
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'_, StoreResult<T>> {
        let error = self.error.detached();
        Box::pin(async move { Err(error) })
    }
}

impl EventStore for ErrorStore {
    fn list_events(
        &self,
        _window: TimeWindow,
        _filters: EventFilters,
    ) -> BoxFuture<'_, StoreResult<Vec<StoredEvent>>> {
        self.fail()
    }

    fn get_event(&self, _id: EventId) -> BoxFuture<'_, StoreResult<StoredEvent>> {
        self.fail()
    }

    fn update_event(&self, _id: EventId, _update: EventUpdate) -> BoxFuture<'_, StoreResult<()>> {
        self.fail()
    }

    fn list_categories(&self) -> BoxFuture<'_, StoreResult<Vec<Category>>> {
        self.fail()
    }
}

impl ReminderStore for ErrorStore {
    fn list_for_event(
        &self,
        _event_id: EventId,
    ) -> BoxFuture<'_, StoreResult<Vec<PersistedReminder>>> {
        self.fail()
    }

    fn create_bulk(
        &self,
        _reminders: Vec<NewReminder>,
    ) -> BoxFuture<'_, StoreResult<BulkCreateResult>> {
        self.fail()
    }

    fn update_reminder(
        &self,
        _id: ReminderId,
        _payload: ReminderPayload,
    ) -> BoxFuture<'_, StoreResult<()>> {
        self.fail()
    }

    fn delete_bulk(&self, _ids: Vec<ReminderId>) -> BoxFuture<'_, StoreResult<BulkDeleteResult>> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorCode;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn filters_builder() {
        let filters = EventFilters::new().with_category(3).with_search("  standup ");
        assert_eq!(filters.category_id, Some(3));
        assert_eq!(filters.search.as_deref(), Some("standup"));
        assert!(!filters.is_empty());
        assert!(EventFilters::new().with_search("   ").is_empty());
    }

    #[tokio::test]
    async fn error_store_fails_everything() {
        let store = ErrorStore::new(StoreError::configuration("no base url").with_store("events"));
        let start = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + Duration::days(30));

        let err = store
            .list_events(window, EventFilters::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::ConfigurationError);
        assert_eq!(err.store(), Some("events"));

        assert!(store.list_for_event(1).await.is_err());
        assert!(store.delete_bulk(vec![1, 2]).await.is_err());
    }
}
