//! Time types and the all-day boundary conversion.
//!
//! The event store keeps all-day ranges with an **inclusive** end (the last
//! millisecond of the last included day) while the calendar surface works
//! with an **exclusive** end (midnight of the following day). This module
//! provides [`CalendarRange`], the [`TimeBoundaryConverter`] that moves a
//! range between the two conventions, and [`TimeWindow`] for querying a
//! visible date range.
//!
//! Every "local" operation is generic over a [`TimeZone`]; day shifting is
//! done on the local calendar date so it stays correct across DST changes.

use chrono::{
    DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Utc,
};
use serde::{Deserialize, Serialize};

/// Duration given to a timed range whose end is missing or not after its start.
pub const DEFAULT_TIMED_DURATION: Duration = Duration::hours(1);

/// Returns the last representable wall-clock time of a day (23:59:59.999).
pub fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time")
}

/// Maps a local wall-clock time to a UTC instant.
///
/// Ambiguous local times (DST fall-back) resolve to the earliest instant.
/// Local times inside a DST gap are interpreted with the offset in effect
/// before the gap, which moves them forward by the gap length.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let before_gap = naive - Duration::hours(3);
            match tz.from_local_datetime(&before_gap).earliest() {
                Some(dt) => {
                    let offset = dt.offset().fix();
                    (naive - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
                }
                None => tz.from_utc_datetime(&naive).with_timezone(&Utc),
            }
        }
    }
}

/// Returns the local calendar date of an instant.
pub fn local_date<Tz: TimeZone>(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Returns the instant of local midnight at the start of `date`.
pub fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_instant(tz, date.and_time(NaiveTime::MIN))
}

/// Returns the instant of 23:59:59.999 local time on `date`.
pub fn day_end<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_instant(tz, date.and_time(end_of_day_time()))
}

/// Returns the instant of `hour`:00:00 local time on `date`.
pub fn day_at_hour<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).expect("valid time");
    local_instant(tz, date.and_time(time))
}

/// Shifts a local date by a signed number of days.
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(date)
}

/// A calendar range as stored or as displayed.
///
/// In storage form an all-day range has a local-midnight start and an
/// inclusive end at 23:59:59.999 of its last day. In display form the end
/// is exclusive: local midnight of the day after the last included day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRange {
    /// Start of the range.
    pub start: DateTime<Utc>,
    /// End of the range (inclusive or exclusive depending on the form).
    pub end: DateTime<Utc>,
    /// Whether this is an all-day range.
    pub is_all_day: bool,
}

impl CalendarRange {
    /// Creates a timed range.
    pub fn timed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            is_all_day: false,
        }
    }

    /// Creates an all-day range.
    pub fn all_day(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            is_all_day: true,
        }
    }

    /// Returns the length of the range.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Converts ranges between the inclusive storage form and the exclusive
/// display form in a given time zone.
#[derive(Debug, Clone)]
pub struct TimeBoundaryConverter<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> TimeBoundaryConverter<Tz> {
    /// Creates a converter working in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Returns the time zone used for local-day arithmetic.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Local midnight at the start of the instant's local day.
    pub fn start_of_day(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        day_start(&self.tz, local_date(&self.tz, instant))
    }

    /// 23:59:59.999 on the instant's local day.
    pub fn end_of_day(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        day_end(&self.tz, local_date(&self.tz, instant))
    }

    /// Moves an instant by whole local calendar days, keeping its wall-clock time.
    pub fn shift_days(&self, instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        let local = instant.with_timezone(&self.tz).naive_local();
        let date = shift_date(local.date(), days);
        local_instant(&self.tz, date.and_time(local.time()))
    }

    /// Converts a stored range to its display form.
    ///
    /// All-day ranges get an exclusive end at midnight after their last
    /// included day. Timed ranges pass through unchanged.
    pub fn to_display(&self, range: &CalendarRange) -> CalendarRange {
        if !range.is_all_day {
            return *range;
        }

        let last_day = local_date(&self.tz, range.end);
        CalendarRange::all_day(range.start, day_start(&self.tz, shift_date(last_day, 1)))
    }

    /// Converts a display range (after a drag, resize or selection) to its
    /// stored form.
    ///
    /// An all-day range whose end is not after its start covers the start
    /// day only. A timed range without a usable end defaults to one hour.
    pub fn to_storage(&self, range: &CalendarRange) -> CalendarRange {
        if range.is_all_day {
            let start = self.start_of_day(range.start);
            let end = self.all_day_storage_end(range.start, Some(range.end));
            CalendarRange::all_day(start, end)
        } else {
            CalendarRange::timed(range.start, timed_end(range.start, Some(range.end)))
        }
    }

    /// Inclusive storage end for an all-day display range.
    ///
    /// `display_end` is exclusive; a missing end is a single-day range.
    pub fn all_day_storage_end(
        &self,
        display_start: DateTime<Utc>,
        display_end: Option<DateTime<Utc>>,
    ) -> DateTime<Utc> {
        match display_end {
            Some(end) if end > display_start => self.end_of_day(self.shift_days(end, -1)),
            _ => self.end_of_day(display_start),
        }
    }
}

/// End of a timed range, defaulting to one hour after `start` when the
/// requested end is missing or not after the start.
pub fn timed_end(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match end {
        Some(end) if end > start => end,
        _ => start + DEFAULT_TIMED_DURATION,
    }
}

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window. The bounds are swapped if given in reverse.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a window covering the local dates `first..=last`.
    pub fn for_dates<Tz: TimeZone>(first: NaiveDate, last: NaiveDate, tz: &Tz) -> Self {
        Self::new(day_start(tz, first), day_start(tz, shift_date(last, 1)))
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if an instant falls within this window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Checks if a range overlaps with this window.
    ///
    /// Display ranges are exclusive at the end, so a range ending exactly at
    /// the window start does not overlap.
    pub fn overlaps(&self, range: &CalendarRange) -> bool {
        range.start < self.end && range.end > self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> DateTime<Utc> {
        utc(y, m, d, h, min, s) + Duration::milliseconds(i64::from(ms))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod converter {
        use super::*;

        #[test]
        fn all_day_to_display_is_exclusive() {
            let converter = TimeBoundaryConverter::new(Utc);
            let stored = CalendarRange::all_day(
                utc(2025, 10, 8, 0, 0, 0),
                utc_ms(2025, 10, 10, 23, 59, 59, 999),
            );

            let display = converter.to_display(&stored);
            assert_eq!(display.start, utc(2025, 10, 8, 0, 0, 0));
            assert_eq!(display.end, utc(2025, 10, 11, 0, 0, 0));
            assert!(display.is_all_day);
        }

        #[test]
        fn single_day_drop_to_storage() {
            let converter = TimeBoundaryConverter::new(Utc);
            let dropped = CalendarRange::all_day(utc(2025, 10, 9, 0, 0, 0), utc(2025, 10, 9, 0, 0, 0));

            let stored = converter.to_storage(&dropped);
            assert_eq!(stored.start, utc(2025, 10, 9, 0, 0, 0));
            assert_eq!(stored.end, utc_ms(2025, 10, 9, 23, 59, 59, 999));
        }

        #[test]
        fn multi_day_to_storage_is_inclusive() {
            let converter = TimeBoundaryConverter::new(Utc);
            let display = CalendarRange::all_day(utc(2025, 10, 8, 0, 0, 0), utc(2025, 10, 11, 0, 0, 0));

            let stored = converter.to_storage(&display);
            assert_eq!(stored.start, utc(2025, 10, 8, 0, 0, 0));
            assert_eq!(stored.end, utc_ms(2025, 10, 10, 23, 59, 59, 999));
        }

        #[test]
        fn one_day_exclusive_range_stays_on_one_day() {
            let converter = TimeBoundaryConverter::new(Utc);
            let display = CalendarRange::all_day(utc(2025, 10, 9, 0, 0, 0), utc(2025, 10, 10, 0, 0, 0));

            let stored = converter.to_storage(&display);
            assert_eq!(stored.start, utc(2025, 10, 9, 0, 0, 0));
            assert_eq!(stored.end, utc_ms(2025, 10, 9, 23, 59, 59, 999));
        }

        #[test]
        fn all_day_storage_start_snaps_to_midnight() {
            let converter = TimeBoundaryConverter::new(Utc);
            let display = CalendarRange::all_day(utc(2025, 10, 9, 13, 45, 0), utc(2025, 10, 9, 13, 45, 0));

            let stored = converter.to_storage(&display);
            assert_eq!(stored.start, utc(2025, 10, 9, 0, 0, 0));
        }

        #[test]
        fn round_trip_all_day_ranges() {
            let converter = TimeBoundaryConverter::new(Utc);
            for (first, last) in [(8, 8), (8, 10), (1, 31)] {
                let stored = CalendarRange::all_day(
                    utc(2025, 10, first, 0, 0, 0),
                    utc_ms(2025, 10, last, 23, 59, 59, 999),
                );
                let back = converter.to_storage(&converter.to_display(&stored));
                assert_eq!(back, stored, "round trip for {first}..={last}");
            }
        }

        #[test]
        fn round_trip_across_dst_in_local_zone() {
            let converter = TimeBoundaryConverter::new(chrono_tz::Europe::Paris);
            // Spans the 2025-10-26 fall-back transition.
            let start = day_start(converter.timezone(), date(2025, 10, 25));
            let end = day_end(converter.timezone(), date(2025, 10, 27));
            let stored = CalendarRange::all_day(start, end);

            let display = converter.to_display(&stored);
            assert_eq!(
                display.end,
                day_start(converter.timezone(), date(2025, 10, 28))
            );
            assert_eq!(converter.to_storage(&display), stored);
        }

        #[test]
        fn timed_passthrough_and_default_duration() {
            let converter = TimeBoundaryConverter::new(Utc);
            let range = CalendarRange::timed(utc(2025, 10, 10, 14, 0, 0), utc(2025, 10, 10, 15, 30, 0));
            assert_eq!(converter.to_display(&range), range);
            assert_eq!(converter.to_storage(&range), range);

            let collapsed =
                CalendarRange::timed(utc(2025, 10, 10, 14, 0, 0), utc(2025, 10, 10, 14, 0, 0));
            assert_eq!(
                converter.to_storage(&collapsed).end,
                utc(2025, 10, 10, 15, 0, 0)
            );
        }

        #[test]
        fn storage_uses_local_days() {
            // UTC+2: local midnight of 2025-10-09 is 2025-10-08T22:00Z.
            let tz = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
            let converter = TimeBoundaryConverter::new(tz);
            let dropped = CalendarRange::all_day(utc(2025, 10, 8, 22, 0, 0), utc(2025, 10, 8, 22, 0, 0));

            let stored = converter.to_storage(&dropped);
            assert_eq!(stored.start, utc(2025, 10, 8, 22, 0, 0));
            assert_eq!(stored.end, utc_ms(2025, 10, 9, 21, 59, 59, 999));
        }
    }

    mod local_days {
        use super::*;

        #[test]
        fn end_of_day_precision() {
            let end = day_end(&Utc, date(2025, 2, 5));
            assert_eq!(end.hour(), 23);
            assert_eq!(end.minute(), 59);
            assert_eq!(end.second(), 59);
            assert_eq!(end.nanosecond(), 999_000_000);
        }

        #[test]
        fn dst_gap_moves_forward() {
            // America/Santiago skips 00:00 -> 01:00 on 2025-09-07.
            let tz = chrono_tz::America::Santiago;
            let start = day_start(&tz, date(2025, 9, 7));
            let local = start.with_timezone(&tz);
            assert_eq!(local.date_naive(), date(2025, 9, 7));
            assert_eq!(local.hour(), 1);
        }

        #[test]
        fn shift_days_keeps_wall_clock_across_dst() {
            let tz = chrono_tz::Europe::Paris;
            let converter = TimeBoundaryConverter::new(tz);
            let before = day_at_hour(&tz, date(2025, 10, 25), 9);
            let after = converter.shift_days(before, 2);
            assert_eq!(after, day_at_hour(&tz, date(2025, 10, 27), 9));
            assert_eq!(after - before, Duration::hours(49));
        }

        #[test]
        fn shift_date_negative() {
            assert_eq!(shift_date(date(2025, 3, 1), -1), date(2025, 2, 28));
            assert_eq!(shift_date(date(2025, 3, 1), 7), date(2025, 3, 8));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn reversed_bounds_are_swapped() {
            let window = TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
            assert_eq!(window.start, utc(2025, 2, 5, 9, 0, 0));
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        fn for_dates_covers_whole_days() {
            let window = TimeWindow::for_dates(date(2025, 10, 1), date(2025, 10, 31), &Utc);
            assert_eq!(window.start, utc(2025, 10, 1, 0, 0, 0));
            assert_eq!(window.end, utc(2025, 11, 1, 0, 0, 0));
            assert!(window.contains(utc(2025, 10, 31, 23, 0, 0)));
            assert!(!window.contains(utc(2025, 11, 1, 0, 0, 0)));
        }

        #[test]
        fn overlaps_uses_exclusive_ends() {
            let window = TimeWindow::new(utc(2025, 10, 9, 0, 0, 0), utc(2025, 10, 10, 0, 0, 0));
            let before = CalendarRange::all_day(utc(2025, 10, 8, 0, 0, 0), utc(2025, 10, 9, 0, 0, 0));
            let inside = CalendarRange::timed(utc(2025, 10, 9, 10, 0, 0), utc(2025, 10, 9, 11, 0, 0));
            assert!(!window.overlaps(&before));
            assert!(window.overlaps(&inside));
        }
    }
}
