//! Client-wide state.
//!
//! Holds what every screen needs (sign-in, categories, zone, reminder
//! settings). One value is created at startup, filled by
//! [`init`](ClientState::init) after sign-in, and emptied by
//! [`reset`](ClientState::reset) on sign-out. It is passed to whatever needs
//! it; nothing reads it globally.

use std::sync::Arc;

use calsync_core::{EventId, ReminderContext, ReminderSettings, TimeWindow};
use calsync_stores::{AuthSession, AuthTokens, Category, EventStore, StoredEvent};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::SessionResult;
use crate::reconciler::DragResizeReconciler;
use crate::reminder_session::event_context;
use crate::view::CalendarView;

/// Categories as last listed.
#[derive(Debug, Clone)]
pub struct CategoryCache {
    pub categories: Vec<Category>,
    pub updated_at: DateTime<Utc>,
}

/// Explicit client state.
#[derive(Debug)]
pub struct ClientState<Tz: TimeZone> {
    tz: Tz,
    auth: Arc<AuthSession>,
    reminder_settings: ReminderSettings,
    default_duration: Duration,
    categories: Option<CategoryCache>,
}

impl<Tz: TimeZone> ClientState<Tz> {
    /// Signed-out state with default settings.
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            auth: Arc::new(AuthSession::new()),
            reminder_settings: ReminderSettings::default(),
            default_duration: calsync_core::time::DEFAULT_TIMED_DURATION,
            categories: None,
        }
    }

    /// Signed-out state using the configured settings.
    pub fn from_config(tz: Tz, config: &ClientConfig) -> Self {
        Self {
            reminder_settings: config.reminder_settings(),
            default_duration: config.default_timed_duration(),
            ..Self::new(tz)
        }
    }

    /// Returns the zone every screen displays in.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Auth session to hand to the REST stores.
    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    /// Returns the configured reminder settings.
    pub fn reminder_settings(&self) -> ReminderSettings {
        self.reminder_settings
    }

    /// Returns true once [`init`](Self::init) has loaded categories.
    pub fn is_initialized(&self) -> bool {
        self.categories.is_some()
    }

    /// Categories loaded by [`init`](Self::init), empty before.
    pub fn categories(&self) -> &[Category] {
        self.categories
            .as_ref()
            .map(|cache| cache.categories.as_slice())
            .unwrap_or_default()
    }

    /// Returns a cached category by id.
    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories().iter().find(|category| category.id == id)
    }

    /// Signs in and loads the data every screen shares.
    pub async fn init<S: EventStore + ?Sized>(
        &mut self,
        store: &S,
        tokens: AuthTokens,
    ) -> SessionResult<()> {
        self.auth.sign_in(tokens);
        self.refresh_categories(store).await
    }

    /// Lists categories again and replaces the cache.
    pub async fn refresh_categories<S: EventStore + ?Sized>(&mut self, store: &S) -> SessionResult<()> {
        let categories = store.list_categories().await?;
        debug!(count = categories.len(), "loaded categories");
        self.categories = Some(CategoryCache {
            categories,
            updated_at: Utc::now(),
        });
        Ok(())
    }

    /// Signs out and drops cached data.
    pub fn reset(&mut self) {
        self.auth.sign_out();
        self.categories = None;
        info!("client state reset");
    }

    /// Empty calendar view over `window`.
    pub fn view(&self, window: TimeWindow) -> CalendarView<Tz> {
        CalendarView::new(self.tz.clone(), window)
    }

    /// Creates a reconciler with the configured default duration.
    pub fn reconciler(&self) -> DragResizeReconciler {
        DragResizeReconciler::new().with_default_duration(self.default_duration)
    }

    /// Reminder context for an event, with the configured settings.
    pub fn reminder_context(&self, event: &StoredEvent) -> ReminderContext<Tz> {
        event_context(event, self.tz.clone(), self.reminder_settings)
    }

    /// Fetches an event and builds its reminder context.
    pub async fn load_reminder_context<S: EventStore + ?Sized>(
        &self,
        store: &S,
        event_id: EventId,
    ) -> SessionResult<ReminderContext<Tz>> {
        let event = store.get_event(event_id).await?;
        Ok(self.reminder_context(&event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_stores::{MemoryStore, StoreOperation};

    fn work() -> Category {
        Category {
            id: 1,
            name: "Work".to_string(),
            color: Some("#3788d8".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn init_and_reset() {
        let store = MemoryStore::new().with_category(work());
        let mut state = ClientState::new(Utc);
        assert!(!state.is_initialized());
        assert!(state.categories().is_empty());

        state.init(&store, AuthTokens::new("token")).await.unwrap();
        assert!(state.is_initialized());
        assert!(state.auth().is_signed_in());
        assert_eq!(state.category(1).map(|c| c.name.as_str()), Some("Work"));

        state.reset();
        assert!(!state.is_initialized());
        assert!(!state.auth().is_signed_in());
    }

    #[tokio::test]
    async fn failed_init_leaves_state_uninitialized() {
        let store = MemoryStore::new().with_category(work());
        store.fail(StoreOperation::ListCategories);
        let mut state = ClientState::new(Utc);
        assert!(state.init(&store, AuthTokens::new("token")).await.is_err());
        assert!(!state.is_initialized());
    }

    #[tokio::test]
    async fn settings_come_from_config() {
        let config: ClientConfig = toml::from_str(
            "[reminders]\nmax_per_event = 5\n[view]\ndefault_timed_duration_minutes = 45",
        )
        .unwrap();
        let state = ClientState::from_config(Utc, &config);
        assert_eq!(state.reminder_settings().max_per_event, 5);
        assert_eq!(state.reconciler().default_duration(), Duration::minutes(45));

        let store = MemoryStore::new().with_event(StoredEvent {
            id: 3,
            title: "retro".to_string(),
            description: None,
            start_datetime: Utc.with_ymd_and_hms(2025, 10, 10, 14, 0, 0).unwrap(),
            end_datetime: None,
            is_all_day: false,
            color: None,
            categories: Vec::new(),
        });
        let ctx = state.load_reminder_context(&store, 3).await.unwrap();
        assert_eq!(ctx.settings.max_per_event, 5);
        assert!(!ctx.is_all_day);
    }
}
