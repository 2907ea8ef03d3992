//! Fixed-offset calendar math.
//!
//! The store keeps naive UTC timestamps; every calendar decision in the app is
//! made in JST (UTC+9, no daylight saving). Dates are derived by shifting the
//! instant and reading the shifted fields, never by consulting the host
//! timezone, so the same input always lands on the same local date.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

pub const UTC_OFFSET_HOURS: i64 = 9;

/// Week start weekday, 0 = Sunday .. 6 = Saturday.
pub const DEFAULT_WEEK_START: u32 = 0;

fn to_local(instant: DateTime<Utc>) -> NaiveDateTime {
    (instant + Duration::hours(UTC_OFFSET_HOURS)).naive_utc()
}

pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    to_local(instant).date()
}

/// Local calendar date as `YYYY-MM-DD`.
pub fn local_date_string(instant: DateTime<Utc>) -> String {
    local_date(instant).to_string()
}

/// The current week as an inclusive local-date range. `end` is always
/// `start + 6` days and runs through the end of that local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// Whether the instant's local date falls inside the window. Date-level
    /// containment means an instant at the final millisecond of the window
    /// belongs to exactly one week.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let date = local_date(instant);
        self.start <= date && date <= self.end
    }

    /// Local date of the Nth day of the window (N in 0..7).
    pub fn day(&self, offset: u32) -> NaiveDate {
        debug_assert!(offset < 7, "week day offset out of range: {offset}");
        self.start + Duration::days(i64::from(offset.min(6)))
    }
}

pub fn current_week(week_start_day: u32) -> WeekWindow {
    current_week_at(Utc::now(), week_start_day)
}

pub fn current_week_at(now: DateTime<Utc>, week_start_day: u32) -> WeekWindow {
    debug_assert!(week_start_day < 7, "week start day out of range: {week_start_day}");
    let today = local_date(now);
    let weekday = today.weekday().num_days_from_sunday();
    let days_back = (weekday + 7 - (week_start_day % 7)) % 7;
    let start = today - Duration::days(i64::from(days_back));
    WeekWindow {
        start,
        end: start + Duration::days(6),
    }
}

/// Convenience wrapper for one-off membership checks against "now".
/// `current_week_at` + [`WeekWindow::contains`] are the canonical entry
/// points; code that filters many records (or injects `now` for determinism)
/// builds the window once and reuses it.
pub fn is_in_current_week(instant: DateTime<Utc>, week_start_day: u32) -> bool {
    current_week(week_start_day).contains(instant)
}

/// Local date string of the Nth day of the current week, for building a fixed
/// 7-point chart axis even when a day has no records. Convenience wrapper
/// over `current_week_at` + [`WeekWindow::day`], the canonical entry points
/// when the window is already at hand.
pub fn weekday_date_string_at(now: DateTime<Utc>, day_of_week: u32, week_start_day: u32) -> String {
    current_week_at(now, week_start_day).day(day_of_week).to_string()
}
