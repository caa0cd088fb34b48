//! Drag, resize and range-select handling.
//!
//! A gesture arrives in display form (exclusive all-day ends). Planning turns
//! it into the storage range written to the event store.
//!
//! The change is shown in the view by [`begin`](DragResizeReconciler::begin)
//! before anything is written. The store write does not borrow the view, so
//! the view stays readable until [`finish`](DragResizeReconciler::finish)
//! settles it.

use calsync_core::time::{day_end, day_start, local_date, shift_date};
use calsync_core::{CalendarRange, EventId, TimeBoundaryConverter};
use calsync_stores::{EventStore, EventUpdate, StoreError, StoreResult};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::view::CalendarView;

/// A gesture on an existing event, in display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// The event was moved. `end` is the new display end when the calendar
    /// reports one. `all_day` is the kind of slot it was dropped on.
    Drop {
        event_id: EventId,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        all_day: bool,
    },
    /// The event's end was dragged.
    Resize {
        event_id: EventId,
        end: DateTime<Utc>,
    },
}

impl Gesture {
    /// Returns the id of the event the gesture acts on.
    pub fn event_id(&self) -> EventId {
        match self {
            Self::Drop { event_id, .. } | Self::Resize { event_id, .. } => *event_id,
        }
    }
}

/// What the create dialog is prefilled with after a range selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewEventDraft {
    /// Local dates, both inclusive. A single-day selection has `first == last`.
    AllDay { first: NaiveDate, last: NaiveDate },
    /// Storage range of a timed event.
    Timed(CalendarRange),
}

impl NewEventDraft {
    /// The range to store when the dialog is confirmed unchanged.
    pub fn storage_range<Tz: TimeZone>(&self, tz: &Tz) -> CalendarRange {
        match *self {
            Self::AllDay { first, last } => {
                CalendarRange::all_day(day_start(tz, first), day_end(tz, last))
            }
            Self::Timed(range) => range,
        }
    }
}

/// A gesture shown in the view whose write has not settled yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingGesture {
    pub id: EventId,
    /// Display range the event had before the gesture.
    pub previous: CalendarRange,
    /// Range to write to the store.
    pub stored: CalendarRange,
}

/// Result of a committed gesture.
#[derive(Debug)]
pub struct CommitOutcome {
    /// Range written to the store.
    pub stored: CalendarRange,
    /// Set when the write succeeded but refreshing the view did not.
    pub reload_error: Option<StoreError>,
}

/// Plans and commits calendar gestures.
#[derive(Debug, Clone, Copy)]
pub struct DragResizeReconciler {
    default_duration: Duration,
}

impl Default for DragResizeReconciler {
    fn default() -> Self {
        Self {
            default_duration: calsync_core::time::DEFAULT_TIMED_DURATION,
        }
    }
}

impl DragResizeReconciler {
    /// Creates a reconciler with the default timed duration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: length given to timed events that lose their end.
    #[must_use]
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        if duration > Duration::zero() {
            self.default_duration = duration;
        }
        self
    }

    /// Returns the length given to timed events that lose their end.
    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// End of a timed range: `end` if it is after `start`, else the default
    /// duration from `start`.
    fn clamp_timed(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match end {
            Some(end) if end > start => end,
            _ => start + self.default_duration,
        }
    }

    /// Storage range after moving an event whose display range was `current`.
    pub fn plan_drop<Tz: TimeZone>(
        &self,
        converter: &TimeBoundaryConverter<Tz>,
        current: &CalendarRange,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        all_day: bool,
    ) -> CalendarRange {
        if all_day {
            // Without a reported end an all-day event keeps its day span.
            let end = end.or_else(|| {
                current.is_all_day.then(|| {
                    let tz = converter.timezone();
                    let moved_days = (local_date(tz, start) - local_date(tz, current.start)).num_days();
                    converter.shift_days(current.end, moved_days)
                })
            });
            CalendarRange::all_day(
                converter.start_of_day(start),
                converter.all_day_storage_end(start, end),
            )
        } else if current.is_all_day {
            CalendarRange::timed(start, start + self.default_duration)
        } else {
            let end = end.unwrap_or(start + current.duration());
            CalendarRange::timed(start, self.clamp_timed(start, Some(end)))
        }
    }

    /// Storage range after dragging the end of an event whose display range
    /// was `current`.
    pub fn plan_resize<Tz: TimeZone>(
        &self,
        converter: &TimeBoundaryConverter<Tz>,
        current: &CalendarRange,
        end: DateTime<Utc>,
    ) -> CalendarRange {
        if current.is_all_day {
            CalendarRange::all_day(
                converter.start_of_day(current.start),
                converter.all_day_storage_end(current.start, Some(end)),
            )
        } else {
            CalendarRange::timed(current.start, self.clamp_timed(current.start, Some(end)))
        }
    }

    /// Draft for a new event from a selection of `start..end` (display form).
    pub fn plan_selection<Tz: TimeZone>(
        &self,
        converter: &TimeBoundaryConverter<Tz>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        all_day: bool,
    ) -> NewEventDraft {
        if all_day {
            let tz = converter.timezone();
            let first = local_date(tz, start);
            let last = local_date(tz, converter.all_day_storage_end(start, Some(end)));
            NewEventDraft::AllDay {
                first,
                last: last.max(first),
            }
        } else {
            NewEventDraft::Timed(CalendarRange::timed(start, self.clamp_timed(start, Some(end))))
        }
    }

    /// Storage range a gesture would write.
    pub fn plan<Tz: TimeZone>(
        &self,
        view: &CalendarView<Tz>,
        gesture: &Gesture,
    ) -> SessionResult<CalendarRange> {
        let id = gesture.event_id();
        let current = view.event(id).ok_or(SessionError::UnknownEvent(id))?.range;
        let converter = view.converter();
        let planned = match *gesture {
            Gesture::Drop {
                start, end, all_day, ..
            } => self.plan_drop(converter, &current, start, end, all_day),
            Gesture::Resize { end, .. } => self.plan_resize(converter, &current, end),
        };
        debug!(id, ?gesture, ?planned, "planned gesture");
        Ok(planned)
    }

    /// Shows a gesture in the view before it is written.
    ///
    /// Nothing is sent to the store. The returned [`PendingGesture`] carries
    /// what [`write`](Self::write) and [`finish`](Self::finish) need.
    pub fn begin<Tz: TimeZone>(
        &self,
        view: &mut CalendarView<Tz>,
        gesture: Gesture,
    ) -> SessionResult<PendingGesture> {
        let id = gesture.event_id();
        let stored = self.plan(view, &gesture)?;
        let display = view.converter().to_display(&stored);
        let previous = view.apply(id, display).ok_or(SessionError::UnknownEvent(id))?;
        Ok(PendingGesture {
            id,
            previous,
            stored,
        })
    }

    /// Writes a pending gesture to the store.
    pub async fn write<S: EventStore + ?Sized>(
        &self,
        store: &S,
        pending: &PendingGesture,
    ) -> StoreResult<()> {
        store
            .update_event(pending.id, EventUpdate::from_range(&pending.stored))
            .await
    }

    /// Settles a pending gesture once its write has returned.
    ///
    /// A rejected write puts the previous range back and returns the error.
    /// After a successful write the view is reloaded; a failed reload is
    /// reported in the outcome and leaves the optimistic range in place.
    pub async fn finish<Tz, S>(
        &self,
        view: &mut CalendarView<Tz>,
        store: &S,
        pending: PendingGesture,
        written: StoreResult<()>,
    ) -> SessionResult<CommitOutcome>
    where
        Tz: TimeZone,
        S: EventStore + ?Sized,
    {
        let PendingGesture {
            id,
            previous,
            stored,
        } = pending;
        if let Err(err) = written {
            error!(id, error = %err, "event update rejected, reverting");
            view.restore(id, previous);
            return Err(err.into());
        }
        info!(id, start = %stored.start, end = %stored.end, all_day = stored.is_all_day, "event moved");

        let reload_error = match view.reload(store).await {
            Ok(_) => None,
            Err(err) => {
                warn!(id, error = %err, "event saved but view reload failed");
                Some(err)
            }
        };
        Ok(CommitOutcome {
            stored,
            reload_error,
        })
    }

    /// Runs [`begin`](Self::begin), [`write`](Self::write) and
    /// [`finish`](Self::finish) in one go, for callers that do not need to
    /// read the view while the write is in flight.
    pub async fn commit<Tz, S>(
        &self,
        view: &mut CalendarView<Tz>,
        store: &S,
        gesture: Gesture,
    ) -> SessionResult<CommitOutcome>
    where
        Tz: TimeZone,
        S: EventStore + ?Sized,
    {
        let pending = self.begin(view, gesture)?;
        let written = self.write(store, &pending).await;
        self.finish(view, store, pending, written).await
    }
}

/// Converts local dates `first..=last` to an all-day display range.
pub fn all_day_display<Tz: TimeZone>(tz: &Tz, first: NaiveDate, last: NaiveDate) -> CalendarRange {
    CalendarRange::all_day(day_start(tz, first), day_start(tz, shift_date(last, 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::TimeWindow;
    use calsync_stores::{MemoryStore, StoreOperation, StoredEvent};
    use chrono_tz::Europe::Paris;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod planning {
        use super::*;

        #[test]
        fn drop_all_day_to_single_day() {
            let converter = TimeBoundaryConverter::new(Utc);
            let current = converter.to_display(&CalendarRange::all_day(
                utc("2025-10-08T00:00:00Z"),
                utc("2025-10-10T23:59:59.999Z"),
            ));
            let planned = DragResizeReconciler::new().plan_drop(
                &converter,
                &current,
                utc("2025-10-09T00:00:00Z"),
                Some(utc("2025-10-10T00:00:00Z")),
                true,
            );
            assert_eq!(
                planned,
                CalendarRange::all_day(utc("2025-10-09T00:00:00Z"), utc("2025-10-09T23:59:59.999Z"))
            );
        }

        #[test]
        fn drop_all_day_keeps_span_without_end() {
            let converter = TimeBoundaryConverter::new(Paris);
            let current = all_day_display(&Paris, date(2025, 10, 24), date(2025, 10, 25));
            let planned = DragResizeReconciler::new().plan_drop(
                &converter,
                &current,
                day_start(&Paris, date(2025, 10, 26)),
                None,
                true,
            );
            assert_eq!(planned.start, day_start(&Paris, date(2025, 10, 26)));
            assert_eq!(planned.end, day_end(&Paris, date(2025, 10, 27)));
        }

        #[test]
        fn drop_all_day_onto_timed_slot() {
            let converter = TimeBoundaryConverter::new(Utc);
            let current = all_day_display(&Utc, date(2025, 10, 8), date(2025, 10, 10));
            let reconciler =
                DragResizeReconciler::new().with_default_duration(Duration::minutes(30));
            let planned = reconciler.plan_drop(
                &converter,
                &current,
                utc("2025-10-09T14:00:00Z"),
                Some(utc("2025-10-12T14:00:00Z")),
                false,
            );
            assert_eq!(
                planned,
                CalendarRange::timed(utc("2025-10-09T14:00:00Z"), utc("2025-10-09T14:30:00Z"))
            );
        }

        #[test]
        fn drop_timed_keeps_duration() {
            let converter = TimeBoundaryConverter::new(Utc);
            let current =
                CalendarRange::timed(utc("2025-10-10T14:00:00Z"), utc("2025-10-10T15:30:00Z"));
            let reconciler = DragResizeReconciler::new();

            let planned =
                reconciler.plan_drop(&converter, &current, utc("2025-10-11T09:00:00Z"), None, false);
            assert_eq!(planned.end, utc("2025-10-11T10:30:00Z"));

            let planned = reconciler.plan_drop(
                &converter,
                &current,
                utc("2025-10-11T09:00:00Z"),
                Some(utc("2025-10-11T08:00:00Z")),
                false,
            );
            assert_eq!(planned.end, utc("2025-10-11T10:00:00Z"));
        }

        #[test]
        fn drop_timed_onto_all_day_row() {
            let converter = TimeBoundaryConverter::new(Paris);
            let current =
                CalendarRange::timed(utc("2025-10-10T12:00:00Z"), utc("2025-10-10T13:00:00Z"));
            let planned = DragResizeReconciler::new().plan_drop(
                &converter,
                &current,
                utc("2025-10-11T22:00:00Z"),
                None,
                true,
            );
            assert!(planned.is_all_day);
            assert_eq!(planned.start, day_start(&Paris, date(2025, 10, 12)));
            assert_eq!(planned.end, day_end(&Paris, date(2025, 10, 12)));
        }

        #[test]
        fn resize() {
            let converter = TimeBoundaryConverter::new(Utc);
            let reconciler = DragResizeReconciler::new();

            let all_day = all_day_display(&Utc, date(2025, 10, 8), date(2025, 10, 8));
            let planned = reconciler.plan_resize(&converter, &all_day, utc("2025-10-11T00:00:00Z"));
            assert_eq!(planned.end, utc("2025-10-10T23:59:59.999Z"));

            let timed =
                CalendarRange::timed(utc("2025-10-10T14:00:00Z"), utc("2025-10-10T15:00:00Z"));
            let planned = reconciler.plan_resize(&converter, &timed, utc("2025-10-10T16:15:00Z"));
            assert_eq!(planned.end, utc("2025-10-10T16:15:00Z"));

            let planned = reconciler.plan_resize(&converter, &timed, utc("2025-10-10T14:00:00Z"));
            assert_eq!(planned.end, utc("2025-10-10T15:00:00Z"));
        }

        #[test]
        fn selection() {
            let converter = TimeBoundaryConverter::new(Paris);
            let reconciler = DragResizeReconciler::new();

            let single = reconciler.plan_selection(
                &converter,
                day_start(&Paris, date(2025, 10, 9)),
                day_start(&Paris, date(2025, 10, 10)),
                true,
            );
            assert_eq!(
                single,
                NewEventDraft::AllDay {
                    first: date(2025, 10, 9),
                    last: date(2025, 10, 9)
                }
            );

            let multi = reconciler.plan_selection(
                &converter,
                day_start(&Paris, date(2025, 10, 24)),
                day_start(&Paris, date(2025, 10, 28)),
                true,
            );
            assert_eq!(
                multi,
                NewEventDraft::AllDay {
                    first: date(2025, 10, 24),
                    last: date(2025, 10, 27)
                }
            );
            assert_eq!(
                multi.storage_range(&Paris).end,
                day_end(&Paris, date(2025, 10, 27))
            );

            let timed = reconciler.plan_selection(
                &converter,
                utc("2025-10-10T14:00:00Z"),
                utc("2025-10-10T14:00:00Z"),
                false,
            );
            assert_eq!(
                timed,
                NewEventDraft::Timed(CalendarRange::timed(
                    utc("2025-10-10T14:00:00Z"),
                    utc("2025-10-10T15:00:00Z")
                ))
            );
        }
    }

    mod commit {
        use super::*;

        fn stored(id: EventId, start: &str, end: &str, all_day: bool) -> StoredEvent {
            StoredEvent {
                id,
                title: "offsite".to_string(),
                description: None,
                start_datetime: utc(start),
                end_datetime: Some(utc(end)),
                is_all_day: all_day,
                color: None,
                categories: Vec::new(),
            }
        }

        async fn loaded_view(store: &MemoryStore) -> CalendarView<Utc> {
            let window = TimeWindow::for_dates(date(2025, 10, 1), date(2025, 10, 31), &Utc);
            let mut view = CalendarView::new(Utc, window);
            view.reload(store).await.unwrap();
            view
        }

        #[tokio::test]
        async fn success_writes_and_reloads() {
            let store = MemoryStore::new().with_event(stored(
                1,
                "2025-10-08T00:00:00Z",
                "2025-10-10T23:59:59.999Z",
                true,
            ));
            let mut view = loaded_view(&store).await;

            let outcome = DragResizeReconciler::new()
                .commit(
                    &mut view,
                    &store,
                    Gesture::Drop {
                        event_id: 1,
                        start: utc("2025-10-09T00:00:00Z"),
                        end: Some(utc("2025-10-10T00:00:00Z")),
                        all_day: true,
                    },
                )
                .await
                .unwrap();

            assert!(outcome.reload_error.is_none());
            let saved = store.event(1).unwrap();
            assert_eq!(saved.start_datetime, utc("2025-10-09T00:00:00Z"));
            assert_eq!(saved.end_datetime, Some(utc("2025-10-09T23:59:59.999Z")));
            assert_eq!(view.event(1).unwrap().range.end, utc("2025-10-10T00:00:00Z"));
            assert_eq!(
                store.calls(),
                vec![
                    StoreOperation::ListEvents,
                    StoreOperation::UpdateEvent,
                    StoreOperation::ListEvents
                ]
            );
        }

        #[tokio::test]
        async fn rejection_reverts_view() {
            let store = MemoryStore::new().with_event(stored(
                1,
                "2025-10-10T14:00:00Z",
                "2025-10-10T15:00:00Z",
                false,
            ));
            let mut view = loaded_view(&store).await;
            let before = view.event(1).unwrap().range;
            store.fail(StoreOperation::UpdateEvent);

            let err = DragResizeReconciler::new()
                .commit(
                    &mut view,
                    &store,
                    Gesture::Resize {
                        event_id: 1,
                        end: utc("2025-10-10T17:00:00Z"),
                    },
                )
                .await
                .unwrap_err();

            assert!(matches!(err, SessionError::Store(_)));
            assert_eq!(view.event(1).unwrap().range, before);
            assert_eq!(store.event(1).unwrap().end_datetime, Some(utc("2025-10-10T15:00:00Z")));
        }

        #[tokio::test]
        async fn failed_reload_keeps_optimistic_range() {
            let store = MemoryStore::new().with_event(stored(
                1,
                "2025-10-10T14:00:00Z",
                "2025-10-10T15:00:00Z",
                false,
            ));
            let mut view = loaded_view(&store).await;
            store.fail(StoreOperation::ListEvents);

            let outcome = DragResizeReconciler::new()
                .commit(
                    &mut view,
                    &store,
                    Gesture::Resize {
                        event_id: 1,
                        end: utc("2025-10-10T17:00:00Z"),
                    },
                )
                .await
                .unwrap();

            assert!(outcome.reload_error.is_some());
            assert_eq!(view.event(1).unwrap().range.end, utc("2025-10-10T17:00:00Z"));
        }

        #[tokio::test]
        async fn view_shows_gesture_while_write_is_pending() {
            let store = MemoryStore::new().with_event(stored(
                1,
                "2025-10-10T14:00:00Z",
                "2025-10-10T15:00:00Z",
                false,
            ));
            let mut view = loaded_view(&store).await;
            let reconciler = DragResizeReconciler::new();

            let pending = reconciler
                .begin(
                    &mut view,
                    Gesture::Drop {
                        event_id: 1,
                        start: utc("2025-10-11T09:00:00Z"),
                        end: None,
                        all_day: false,
                    },
                )
                .unwrap();
            assert_eq!(
                pending.previous,
                CalendarRange::timed(utc("2025-10-10T14:00:00Z"), utc("2025-10-10T15:00:00Z"))
            );

            let write = reconciler.write(&store, &pending);
            // The view is free while the write future exists.
            let shown = view.event(1).unwrap().range;
            assert_eq!(shown.start, utc("2025-10-11T09:00:00Z"));
            assert_eq!(store.event(1).unwrap().start_datetime, utc("2025-10-10T14:00:00Z"));

            let written = write.await;
            assert!(written.is_ok());
            assert_eq!(store.event(1).unwrap().end_datetime, Some(utc("2025-10-11T10:00:00Z")));

            let outcome = reconciler.finish(&mut view, &store, pending, written).await.unwrap();
            assert_eq!(outcome.stored, pending.stored);
            assert_eq!(view.event(1).unwrap().range.end, utc("2025-10-11T10:00:00Z"));
        }

        #[tokio::test]
        async fn rejected_write_reverts_in_finish() {
            let store = MemoryStore::new().with_event(stored(
                1,
                "2025-10-10T14:00:00Z",
                "2025-10-10T15:00:00Z",
                false,
            ));
            let mut view = loaded_view(&store).await;
            let reconciler = DragResizeReconciler::new();
            store.fail(StoreOperation::UpdateEvent);

            let pending = reconciler
                .begin(
                    &mut view,
                    Gesture::Resize {
                        event_id: 1,
                        end: utc("2025-10-10T18:00:00Z"),
                    },
                )
                .unwrap();
            let written = reconciler.write(&store, &pending).await;
            assert_eq!(view.event(1).unwrap().range.end, utc("2025-10-10T18:00:00Z"));

            let err = reconciler.finish(&mut view, &store, pending, written).await.unwrap_err();
            assert!(matches!(err, SessionError::Store(_)));
            assert_eq!(view.event(1).unwrap().range, pending.previous);
        }

        #[tokio::test]
        async fn unknown_event_makes_no_call() {
            let store = MemoryStore::new();
            let mut view = loaded_view(&store).await;

            let err = DragResizeReconciler::new()
                .commit(
                    &mut view,
                    &store,
                    Gesture::Resize {
                        event_id: 9,
                        end: utc("2025-10-10T17:00:00Z"),
                    },
                )
                .await
                .unwrap_err();

            assert!(matches!(err, SessionError::UnknownEvent(9)));
            assert_eq!(store.calls(), vec![StoreOperation::ListEvents]);
        }
    }
}
