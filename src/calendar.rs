use crate::models::{DayStats, HeatmapCell};
use chrono::{Datelike, NaiveDate};

/// Rows of 7 slots each; `None` slots pad days outside the month.
pub type MonthGrid = Vec<Vec<Option<HeatmapCell>>>;

/// Lay out one month as Sunday-first weeks for the heatmap. Days absent from
/// `days` become zero-count cells. Returns `None` for a year/month pair that
/// is not a real calendar month; callers treat that as a contract violation.
pub fn build_month_grid(year: i32, month: u32, days: &[DayStats]) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let first_weekday = first.weekday().num_days_from_sunday();
    let day_count = days_in_month(year, month)?;

    let mut weeks: MonthGrid = Vec::new();
    let mut week: Vec<Option<HeatmapCell>> = Vec::with_capacity(7);
    for _ in 0..first_weekday {
        week.push(None);
    }

    for day in 1..=day_count {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let count = days
            .iter()
            .find(|stats| stats.date == date)
            .map(|stats| stats.record_count)
            .unwrap_or(0);
        week.push(Some(HeatmapCell { date, count }));

        if week.len() == 7 {
            weeks.push(std::mem::replace(&mut week, Vec::with_capacity(7)));
        }
    }

    if !week.is_empty() {
        while week.len() < 7 {
            week.push(None);
        }
        weeks.push(week);
    }

    Some(weeks)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    Some((next - first).num_days() as u32)
}

/// Heatmap shade tier, 0 (empty) through 4 (busiest). Monotonic with fixed
/// breakpoints; anything at or below zero stays on the lowest tier.
pub fn intensity(count: u64) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2 => 2,
        3 => 3,
        _ => 4,
    }
}
