//! Reminder data types: editable form values, persisted records and the
//! canonical payload written back to the reminder store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::preset::Preset;

/// Identifier of a persisted reminder.
pub type ReminderId = i64;

/// Identifier of a calendar event.
pub type EventId = i64;

/// How a reminder is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    Email,
    Push,
    Sms,
}

impl NotificationType {
    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Push => "push",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "push" => Ok(Self::Push),
            "sms" => Ok(Self::Sms),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}

/// Whether a form value was picked from a preset or entered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMode {
    Preset,
    Custom,
}

/// What the user chose for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ReminderSpec {
    /// A named preset.
    Preset(Preset),
    /// A custom number of minutes before the start (timed events).
    CustomMinutes(i64),
    /// A custom wall-clock instant (all-day events).
    CustomDateTime(DateTime<Utc>),
}

impl ReminderSpec {
    /// Returns the editing mode of this spec.
    pub fn mode(&self) -> ReminderMode {
        match self {
            Self::Preset(_) => ReminderMode::Preset,
            Self::CustomMinutes(_) | Self::CustomDateTime(_) => ReminderMode::Custom,
        }
    }
}

/// An editable reminder, alive for the duration of one edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFormValue {
    /// Persisted id, `None` for a reminder added in this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReminderId>,
    /// The chosen preset or custom value.
    #[serde(flatten)]
    pub spec: ReminderSpec,
    /// Delivery channel.
    #[serde(default)]
    pub notification_type: NotificationType,
}

impl ReminderFormValue {
    /// Creates a new (unsaved) value from a spec.
    pub fn new(spec: ReminderSpec) -> Self {
        Self {
            id: None,
            spec,
            notification_type: NotificationType::default(),
        }
    }

    /// Creates a new value from a preset.
    pub fn preset(preset: impl Into<Preset>) -> Self {
        Self::new(ReminderSpec::Preset(preset.into()))
    }

    /// Creates a new value with custom minutes before the start.
    pub fn custom_minutes(minutes: i64) -> Self {
        Self::new(ReminderSpec::CustomMinutes(minutes))
    }

    /// Creates a new value firing at a custom instant.
    pub fn custom_date_time(at: DateTime<Utc>) -> Self {
        Self::new(ReminderSpec::CustomDateTime(at))
    }

    /// Builder: attach a persisted id.
    #[must_use]
    pub fn with_id(mut self, id: ReminderId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder: set the delivery channel.
    #[must_use]
    pub fn with_notification_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = notification_type;
        self
    }

    /// Returns the editing mode.
    pub fn mode(&self) -> ReminderMode {
        self.spec.mode()
    }

    /// Returns the preset, if this value was picked from one.
    pub fn preset_value(&self) -> Option<Preset> {
        match self.spec {
            ReminderSpec::Preset(preset) => Some(preset),
            _ => None,
        }
    }
}

/// When a reminder fires, in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Trigger {
    /// Fires a number of minutes before the event start.
    Relative { minutes_before: u32 },
    /// Fires at a fixed instant.
    Absolute { reminder_time: DateTime<Utc> },
}

impl Trigger {
    /// Creates a relative trigger.
    pub fn relative(minutes_before: u32) -> Self {
        Self::Relative { minutes_before }
    }

    /// Creates an absolute trigger.
    pub fn absolute(reminder_time: DateTime<Utc>) -> Self {
        Self::Absolute { reminder_time }
    }

    /// Returns true for a relative trigger.
    pub fn is_relative(&self) -> bool {
        matches!(self, Self::Relative { .. })
    }

    /// The concrete instant at which the reminder fires for an event
    /// starting at `event_start`.
    pub fn fire_time(&self, event_start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Relative { minutes_before } => {
                event_start - Duration::minutes(i64::from(*minutes_before))
            }
            Self::Absolute { reminder_time } => *reminder_time,
        }
    }
}

/// A canonical reminder ready to be written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    #[serde(flatten)]
    pub trigger: Trigger,
    pub notification_type: NotificationType,
}

impl ReminderPayload {
    /// Creates a payload.
    pub fn new(trigger: Trigger, notification_type: NotificationType) -> Self {
        Self {
            trigger,
            notification_type,
        }
    }

    /// Returns true when the persisted record already holds exactly this
    /// trigger and delivery channel.
    pub fn matches(&self, persisted: &PersistedReminder) -> bool {
        if persisted.notification_type != self.notification_type {
            return false;
        }
        match self.trigger {
            Trigger::Relative { minutes_before } => {
                persisted.is_relative && persisted.minutes_before == Some(i64::from(minutes_before))
            }
            Trigger::Absolute { reminder_time } => {
                !persisted.is_relative && persisted.reminder_time == Some(reminder_time)
            }
        }
    }
}

/// A reminder as held by the reminder store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedReminder {
    pub id: ReminderId,
    pub event_id: EventId,
    pub reminder_time: Option<DateTime<Utc>>,
    pub minutes_before: Option<i64>,
    pub is_relative: bool,
    #[serde(default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub notification_sent: bool,
}

impl PersistedReminder {
    /// Creates a relative record.
    pub fn relative(id: ReminderId, event_id: EventId, minutes_before: i64) -> Self {
        Self {
            id,
            event_id,
            reminder_time: None,
            minutes_before: Some(minutes_before),
            is_relative: true,
            notification_type: NotificationType::default(),
            notification_sent: false,
        }
    }

    /// Creates an absolute record.
    pub fn absolute(id: ReminderId, event_id: EventId, reminder_time: DateTime<Utc>) -> Self {
        Self {
            id,
            event_id,
            reminder_time: Some(reminder_time),
            minutes_before: None,
            is_relative: false,
            notification_type: NotificationType::default(),
            notification_sent: false,
        }
    }

    /// Builder: set the delivery channel.
    #[must_use]
    pub fn with_notification_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = notification_type;
        self
    }

    /// The canonical trigger, if the record has a recognizable shape.
    ///
    /// Relative records need a non-negative `minutes_before`; absolute
    /// records need a `reminder_time`.
    pub fn trigger(&self) -> Option<Trigger> {
        if self.is_relative {
            self.minutes_before
                .and_then(|m| u32::try_from(m).ok())
                .map(Trigger::relative)
        } else {
            self.reminder_time.map(Trigger::absolute)
        }
    }
}
