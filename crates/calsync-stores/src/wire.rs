//! Wire types exchanged with the event and reminder stores.
//!
//! Field names are snake_case. Timestamps are written as ISO-8601 UTC with a
//! `Z` suffix; on read, naive ISO timestamps (which the store emits for some
//! reminder fields) are taken as UTC and HTTP-date strings are accepted too.

use calsync_core::{
    CalendarRange, EventId, NotificationType, PersistedReminder, ReminderId, ReminderPayload,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lenient timestamp (de)serialization.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Parses a store timestamp.
    ///
    /// Accepts RFC 3339, naive ISO-8601 (read as UTC) and RFC 2822.
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        DateTime::parse_from_rfc2822(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Formats a timestamp the way the store expects it.
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Writes RFC 3339 with milliseconds and a `Z` suffix.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    /// Reads RFC 3339, or a naive timestamp as UTC.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    /// Same as the parent module, for nullable fields.
    pub mod option {
        use super::*;

        /// Writes the timestamp, or null.
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&format(value)),
                None => serializer.serialize_none(),
            }
        }

        /// Reads a timestamp, or null.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw))),
                None => Ok(None),
            }
        }
    }
}

/// A category attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An event as held by the event store.
///
/// All-day events carry an inclusive end (23:59:59.999 of their last local
/// day). The end may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub start_datetime: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl StoredEvent {
    /// The stored range. A missing end is taken to equal the start.
    pub fn storage_range(&self) -> CalendarRange {
        let end = self.end_datetime.unwrap_or(self.start_datetime);
        CalendarRange {
            start: self.start_datetime,
            end,
            is_all_day: self.is_all_day,
        }
    }
}

/// Body of an event update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventUpdate {
    #[serde(with = "timestamp")]
    pub start_datetime: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_datetime: DateTime<Utc>,
    pub is_all_day: bool,
}

impl EventUpdate {
    /// Moves an event to a storage range.
    pub fn from_range(range: &CalendarRange) -> Self {
        Self {
            start_datetime: range.start,
            end_datetime: range.end,
            is_all_day: range.is_all_day,
        }
    }
}

/// A reminder as returned by the reminder store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReminderRecord {
    pub id: ReminderId,
    pub event_id: EventId,
    #[serde(default, with = "timestamp::option")]
    pub reminder_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub minutes_before: Option<i64>,
    #[serde(default)]
    pub is_relative: Option<bool>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub notification_sent: bool,
}

impl ReminderRecord {
    /// Converts to the core model.
    ///
    /// A missing `is_relative` is inferred from which trigger field is set.
    /// An unknown notification type falls back to the default channel.
    pub fn into_persisted(self) -> PersistedReminder {
        let notification_type = match self.notification_type.as_deref() {
            None => NotificationType::default(),
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(id = self.id, %err, "using default notification type");
                NotificationType::default()
            }),
        };
        PersistedReminder {
            id: self.id,
            event_id: self.event_id,
            reminder_time: self.reminder_time,
            minutes_before: self.minutes_before,
            is_relative: self.is_relative.unwrap_or(self.minutes_before.is_some()),
            notification_type,
            notification_sent: self.notification_sent,
        }
    }
}

/// One item of a bulk create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewReminder {
    pub event_id: EventId,
    #[serde(flatten)]
    pub payload: ReminderPayload,
}

impl NewReminder {
    /// Creates a reminder for `event_id`.
    pub fn new(event_id: EventId, payload: ReminderPayload) -> Self {
        Self { event_id, payload }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateRequest {
    pub reminders: Vec<NewReminder>,
}

/// Outcome of a bulk create. The store creates what it can and reports
/// per-item errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BulkCreateResult {
    pub created_count: usize,
    #[serde(default)]
    pub reminders: Vec<ReminderRecord>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteRequest {
    pub reminder_ids: Vec<ReminderId>,
}

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BulkDeleteResult {
    pub deleted_count: usize,
    #[serde(default)]
    pub deleted_ids: Vec<ReminderId>,
    #[serde(default)]
    pub not_found_ids: Vec<ReminderId>,
}
