//! The visible part of the calendar.
//!
//! Events are held in display form: all-day events end at local midnight
//! after their last day, as a calendar grid draws them.

use calsync_core::{CalendarRange, EventId, TimeBoundaryConverter, TimeWindow};
use calsync_stores::{EventFilters, EventStore, StoreResult, StoredEvent};
use chrono::TimeZone;
use serde::Serialize;
use tracing::debug;

/// An event as drawn on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEvent {
    pub id: EventId,
    pub title: String,
    /// Display-form range.
    pub range: CalendarRange,
    pub color: Option<String>,
}

/// The visible date range, its filters, and the events inside it.
#[derive(Debug, Clone)]
pub struct CalendarView<Tz: TimeZone> {
    converter: TimeBoundaryConverter<Tz>,
    window: TimeWindow,
    filters: EventFilters,
    events: Vec<DisplayEvent>,
}

impl<Tz: TimeZone> CalendarView<Tz> {
    /// Creates an empty view over `window`.
    pub fn new(tz: Tz, window: TimeWindow) -> Self {
        Self {
            converter: TimeBoundaryConverter::new(tz),
            window,
            filters: EventFilters::default(),
            events: Vec::new(),
        }
    }

    /// Builder: sets the filters used by [`reload`](Self::reload).
    #[must_use]
    pub fn with_filters(mut self, filters: EventFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Returns the converter for the view's zone.
    pub fn converter(&self) -> &TimeBoundaryConverter<Tz> {
        &self.converter
    }

    /// Returns the window the events were loaded for.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Moves the view. Takes effect on the next [`reload`](Self::reload).
    pub fn set_window(&mut self, window: TimeWindow) {
        self.window = window;
    }

    /// Returns the current filters.
    pub fn filters(&self) -> &EventFilters {
        &self.filters
    }

    /// Changes the filters. Takes effect on the next [`reload`](Self::reload).
    pub fn set_filters(&mut self, filters: EventFilters) {
        self.filters = filters;
    }

    /// Returns the loaded events, in display form.
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Returns one loaded event.
    pub fn event(&self, id: EventId) -> Option<&DisplayEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Converts a stored event to display form.
    pub fn display_event(&self, stored: &StoredEvent) -> DisplayEvent {
        DisplayEvent {
            id: stored.id,
            title: stored.title.clone(),
            range: self.converter.to_display(&stored.storage_range()),
            color: stored.color.clone(),
        }
    }

    /// Replaces the events with the store's listing of the current window.
    ///
    /// On error the current events are left untouched.
    pub async fn reload<S: EventStore + ?Sized>(&mut self, store: &S) -> StoreResult<usize> {
        let stored = store.list_events(self.window, self.filters.clone()).await?;
        self.events = stored.iter().map(|event| self.display_event(event)).collect();
        debug!(
            count = self.events.len(),
            start = %self.window.start,
            end = %self.window.end,
            "reloaded calendar view"
        );
        Ok(self.events.len())
    }

    /// Sets an event's display range, returning the range it replaced.
    pub fn apply(&mut self, id: EventId, range: CalendarRange) -> Option<CalendarRange> {
        self.events
            .iter_mut()
            .find(|event| event.id == id)
            .map(|event| std::mem::replace(&mut event.range, range))
    }

    /// Puts back a range returned by [`apply`](Self::apply).
    pub fn restore(&mut self, id: EventId, previous: CalendarRange) {
        if self.apply(id, previous).is_none() {
            debug!(id, "event left the view before restore");
        }
    }
}
