use crate::models::{DayStats, PeriodStats, Record, ScoreSlice, StatsSummary, WeekPoint};
use crate::timezone;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 5;

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn score_bucket(score: u8) -> Option<usize> {
    (SCORE_MIN..=SCORE_MAX)
        .contains(&score)
        .then(|| usize::from(score - SCORE_MIN))
}

/// Count/sum/average over whatever records the iterator yields. Empty input
/// yields the all-zero stats, never a division error.
pub fn aggregate<'a, I>(records: I) -> PeriodStats
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut count = 0u64;
    let mut total = 0u64;
    for record in records {
        count += 1;
        total = total.saturating_add(u64::from(record.score));
    }
    let average = if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    };
    PeriodStats {
        record_count: count,
        total_score: total,
        average_score: average,
    }
}

pub fn summary(week_start_day: u32, records: &[Record]) -> StatsSummary {
    summary_at(Utc::now(), week_start_day, records)
}

/// Each period is an independent filter over the same list; a record near a
/// local-midnight boundary lands in exactly the periods its local date says.
pub fn summary_at(now: DateTime<Utc>, week_start_day: u32, records: &[Record]) -> StatsSummary {
    let today = timezone::local_date(now);
    let week = timezone::current_week_at(now, week_start_day);

    StatsSummary {
        today: aggregate(
            records
                .iter()
                .filter(|r| timezone::local_date(r.created_at) == today),
        ),
        this_week: aggregate(records.iter().filter(|r| week.contains(r.created_at))),
        this_month: aggregate(records.iter().filter(|r| {
            let date = timezone::local_date(r.created_at);
            date.year() == today.year() && date.month() == today.month()
        })),
        all_time: aggregate(records.iter()),
    }
}

/// Local date -> per-score counts. Accumulation is commutative, so input
/// order never changes the result. Records with an out-of-range stored score
/// are skipped rather than miscounted.
pub fn bucket_by_day<'a, I>(records: I) -> BTreeMap<NaiveDate, [u64; 5]>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut days: BTreeMap<NaiveDate, [u64; 5]> = BTreeMap::new();
    for record in records {
        let Some(bucket) = score_bucket(record.score) else {
            continue;
        };
        let counts = days
            .entry(timezone::local_date(record.created_at))
            .or_default();
        counts[bucket] += 1;
    }
    days
}

pub fn weekly_points(week_start_day: u32, records: &[Record]) -> Vec<WeekPoint> {
    weekly_points_at(Utc::now(), week_start_day, records)
}

/// Always exactly 7 points, one per weekday of the current window, zero-filled
/// for days without records.
pub fn weekly_points_at(
    now: DateTime<Utc>,
    week_start_day: u32,
    records: &[Record],
) -> Vec<WeekPoint> {
    let week = timezone::current_week_at(now, week_start_day);
    let days = bucket_by_day(records.iter().filter(|r| week.contains(r.created_at)));

    (0..7)
        .map(|offset| {
            let date = week.day(offset);
            WeekPoint {
                date: date.to_string(),
                label: WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize].to_string(),
                weekday: offset,
                score_counts: days.get(&date).copied().unwrap_or_default(),
            }
        })
        .collect()
}

/// One slice per score 1..=5, zero counts included. Callers that only render
/// non-empty slices filter afterwards.
pub fn distribution(records: &[Record]) -> Vec<ScoreSlice> {
    let mut counts = [0u64; 5];
    let mut total = 0u64;
    for record in records {
        if let Some(bucket) = score_bucket(record.score) {
            counts[bucket] += 1;
            total += 1;
        }
    }

    counts
        .iter()
        .enumerate()
        .map(|(index, &count)| ScoreSlice {
            score: SCORE_MIN + index as u8,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect()
}

/// Per-day stats for one local calendar month, days without records omitted.
pub fn month_day_stats(year: i32, month: u32, records: &[Record]) -> Vec<DayStats> {
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for record in records {
        let date = timezone::local_date(record.created_at);
        if date.year() == year && date.month() == month {
            let entry = days.entry(date).or_default();
            entry.0 += 1;
            entry.1 = entry.1.saturating_add(u64::from(record.score));
        }
    }

    days.into_iter()
        .map(|(date, (count, total))| DayStats {
            date,
            record_count: count,
            total_score: total,
            average_score: if count == 0 {
                0.0
            } else {
                total as f64 / count as f64
            },
        })
        .collect()
}
