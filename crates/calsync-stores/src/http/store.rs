//! [`EventStore`] and [`ReminderStore`] over the REST API.

use std::sync::Arc;

use calsync_core::{EventId, PersistedReminder, ReminderId, ReminderPayload, TimeWindow};
use reqwest::Method;
use tracing::{debug, info};

use super::client::RestClient;
use super::config::HttpStoreConfig;
use crate::auth::AuthSession;
use crate::envelope::{decode_item, decode_list};
use crate::error::{StoreError, StoreResult};
use crate::store::{BoxFuture, EventFilters, EventStore, ReminderStore};
use crate::wire::{
    BulkCreateRequest, BulkCreateResult, BulkDeleteRequest, BulkDeleteResult, Category,
    EventUpdate, NewReminder, ReminderRecord, StoredEvent, timestamp,
};

/// REST-backed event and reminder store.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: RestClient,
}

impl HttpStore {
    /// Creates a store for the API root in `config`, authenticating with `auth`.
    pub fn new(config: HttpStoreConfig, auth: Arc<AuthSession>) -> StoreResult<Self> {
        Ok(Self {
            client: RestClient::new(config, auth)?,
        })
    }

    /// Returns the underlying REST client.
    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

/// Query string for an event listing.
pub fn event_query(window: &TimeWindow, filters: &EventFilters) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("start_date", timestamp::format(&window.start)),
        ("end_date", timestamp::format(&window.end)),
    ];
    if let Some(category_id) = filters.category_id {
        query.push(("category_id", category_id.to_string()));
    }
    if let Some(search) = &filters.search {
        query.push(("search", search.clone()));
    }
    query
}

impl EventStore for HttpStore {
    fn list_events(
        &self,
        window: TimeWindow,
        filters: EventFilters,
    ) -> BoxFuture<'_, StoreResult<Vec<StoredEvent>>> {
        Box::pin(async move {
            let body = self
                .client
                .get("events", &event_query(&window, &filters))
                .await
                .map_err(|e| e.with_store("events"))?;
            let events: Vec<StoredEvent> = decode_list(&body, "events").or_empty("events");
            debug!(count = events.len(), "listed events");
            Ok(events)
        })
    }

    fn get_event(&self, id: EventId) -> BoxFuture<'_, StoreResult<StoredEvent>> {
        Box::pin(async move {
            let body = self
                .client
                .get(&format!("events/{}", id), &[])
                .await
                .map_err(|e| e.with_store("events"))?;
            decode_item(&body, "event").into_option().ok_or_else(|| {
                StoreError::invalid_response(format!("event {} missing from response", id))
                    .with_store("events")
            })
        })
    }

    fn update_event(&self, id: EventId, update: EventUpdate) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.client
                .send_json(Method::PUT, &format!("events/{}", id), &update)
                .await
                .map_err(|e| e.with_store("events"))?;
            info!(id, all_day = update.is_all_day, "updated event");
            Ok(())
        })
    }

    fn list_categories(&self) -> BoxFuture<'_, StoreResult<Vec<Category>>> {
        Box::pin(async move {
            let body = self
                .client
                .get("categories", &[])
                .await
                .map_err(|e| e.with_store("categories"))?;
            Ok(decode_list(&body, "categories").or_empty("categories"))
        })
    }
}

impl ReminderStore for HttpStore {
    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> BoxFuture<'_, StoreResult<Vec<PersistedReminder>>> {
        Box::pin(async move {
            let body = self
                .client
                .get(&format!("reminders/event/{}/reminders", event_id), &[])
                .await
                .map_err(|e| e.with_store("reminders"))?;
            let records: Vec<ReminderRecord> = decode_list(&body, "reminders").or_empty("reminders");
            Ok(records.into_iter().map(ReminderRecord::into_persisted).collect())
        })
    }

    fn create_bulk(
        &self,
        reminders: Vec<NewReminder>,
    ) -> BoxFuture<'_, StoreResult<BulkCreateResult>> {
        Box::pin(async move {
            let requested = reminders.len();
            let body = self
                .client
                .send_json(Method::POST, "reminders/bulk", &BulkCreateRequest { reminders })
                .await
                .map_err(|e| e.with_store("reminders"))?;
            let result: BulkCreateResult = decode_item(&body, "result").into_option().ok_or_else(
                || StoreError::invalid_response("bulk create summary missing").with_store("reminders"),
            )?;
            info!(requested, created = result.created_count, errors = result.errors.len(), "created reminders");
            Ok(result)
        })
    }

    fn update_reminder(
        &self,
        id: ReminderId,
        payload: ReminderPayload,
    ) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.client
                .send_json(Method::PUT, &format!("reminders/{}", id), &payload)
                .await
                .map_err(|e| e.with_store("reminders"))?;
            info!(id, "updated reminder");
            Ok(())
        })
    }

    fn delete_bulk(&self, ids: Vec<ReminderId>) -> BoxFuture<'_, StoreResult<BulkDeleteResult>> {
        Box::pin(async move {
            let requested = ids.len();
            let body = self
                .client
                .send_json(Method::DELETE, "reminders/bulk", &BulkDeleteRequest { reminder_ids: ids })
                .await
                .map_err(|e| e.with_store("reminders"))?;
            let result: BulkDeleteResult = decode_item(&body, "result").into_option().ok_or_else(
                || StoreError::invalid_response("bulk delete summary missing").with_store("reminders"),
            )?;
            info!(requested, deleted = result.deleted_count, "deleted reminders");
            Ok(result)
        })
    }
}
