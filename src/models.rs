use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged attempt: a short note plus a 1-5 score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub score: u8,
    pub created_at: DateTime<Utc>,
}

/// The whole persisted document. One local profile per data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppData {
    pub user_id: Uuid,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            records: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub content: String,
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub content: Option<String>,
    pub score: Option<i64>,
}

/// Count/sum/average over one named period. `average_score` is zero when the
/// period is empty, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodStats {
    pub record_count: u64,
    pub total_score: u64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub today: PeriodStats,
    pub this_week: PeriodStats,
    pub this_month: PeriodStats,
    pub all_time: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub record_count: u64,
    pub total_score: u64,
    pub average_score: f64,
}

/// Days with at least one record in the requested month. Consumers fill
/// zero-count cells for absent dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarStats {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u64,
}

/// One weekday of the current week window. `score_counts[i]` is the number of
/// records with score `i + 1` on that local date. `label` is the short
/// weekday name of the local date, precomputed here so chart rendering never
/// re-parses the date in the viewer's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekPoint {
    pub date: String,
    pub label: String,
    pub weekday: u32,
    pub score_counts: [u64; 5],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSlice {
    pub score: u8,
    pub count: u64,
    pub percentage: f64,
}

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}
