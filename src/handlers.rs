use crate::calendar;
use crate::errors::{AppError, ValidatedJson};
use crate::models::{
    ApiResponse, CalendarStats, CreateRecordRequest, Record, ScoreSlice, StatsSummary,
    UpdateRecordRequest, WeekPoint,
};
use crate::state::AppState;
use crate::stats;
use crate::storage::persist_data;
use crate::timezone;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

const MAX_CONTENT_CHARS: usize = 1000;
const DEFAULT_LIST_LIMIT: usize = 100;
const MAX_LIST_LIMIT: usize = 500;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let now = Utc::now();
    let today = timezone::local_date(now);
    let data = state.data.lock().await;
    let summary = stats::summary_at(now, state.week_start_day, &data.records);
    let days = stats::month_day_stats(today.year(), today.month(), &data.records);
    let grid = calendar::build_month_grid(today.year(), today.month(), &days).unwrap_or_default();

    Html(render_index(
        &today.to_string(),
        today.year(),
        today.month(),
        &summary,
        &grid,
    ))
}

pub async fn create_record(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Record>>), AppError> {
    let content = validate_content(&payload.content)?;
    let score = validate_score(payload.score)?;

    let mut data = state.data.lock().await;
    let record = Record {
        id: Uuid::new_v4(),
        user_id: data.user_id,
        content,
        score,
        created_at: Utc::now(),
    };
    data.records.push(record.clone());
    persist_data(&state.data_path, &data).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(record, "Record created successfully.")),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Record>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let data = state.data.lock().await;

    let mut records = data.records.clone();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit);

    Ok(Json(ApiResponse::new(
        records,
        "Records retrieved successfully.",
    )))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Record>>, AppError> {
    let data = state.data.lock().await;
    let record = data
        .records
        .iter()
        .find(|record| record.id == id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Record not found."))?;

    Ok(Json(ApiResponse::new(
        record,
        "Record retrieved successfully.",
    )))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRecordRequest>,
) -> Result<Json<ApiResponse<Record>>, AppError> {
    let content = payload
        .content
        .as_deref()
        .map(validate_content)
        .transpose()?;
    let score = payload.score.map(validate_score).transpose()?;

    let mut data = state.data.lock().await;
    let record = {
        let record = data
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| AppError::not_found("Record not found."))?;
        if let Some(content) = content {
            record.content = content;
        }
        if let Some(score) = score {
            record.score = score;
        }
        record.clone()
    };
    persist_data(&state.data_path, &data).await?;

    Ok(Json(ApiResponse::new(
        record,
        "Record updated successfully.",
    )))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    let mut data = state.data.lock().await;
    let before = data.records.len();
    data.records.retain(|record| record.id != id);
    if data.records.len() == before {
        return Err(AppError::not_found("Record not found."));
    }
    persist_data(&state.data_path, &data).await?;

    Ok(Json(ApiResponse::new(id, "Record deleted successfully.")))
}

pub async fn stats_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsSummary>>, AppError> {
    let data = state.data.lock().await;
    let summary = stats::summary(state.week_start_day, &data.records);

    Ok(Json(ApiResponse::new(
        summary,
        "Stats summary retrieved successfully.",
    )))
}

pub async fn stats_weekly(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WeekPoint>>>, AppError> {
    let data = state.data.lock().await;
    let points = stats::weekly_points(state.week_start_day, &data.records);

    Ok(Json(ApiResponse::new(
        points,
        "Weekly stats retrieved successfully.",
    )))
}

pub async fn stats_distribution(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ScoreSlice>>>, AppError> {
    let data = state.data.lock().await;
    // All five buckets are computed; only the non-empty ones are rendered.
    let slices: Vec<ScoreSlice> = stats::distribution(&data.records)
        .into_iter()
        .filter(|slice| slice.count > 0)
        .collect();

    Ok(Json(ApiResponse::new(
        slices,
        "Score distribution retrieved successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub async fn stats_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<ApiResponse<CalendarStats>>, AppError> {
    let today = timezone::local_date(Utc::now());
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("month must be between 1 and 12"));
    }
    if !(1970..=9999).contains(&year) {
        return Err(AppError::bad_request("year must be between 1970 and 9999"));
    }

    let data = state.data.lock().await;
    let days = stats::month_day_stats(year, month, &data.records);

    Ok(Json(ApiResponse::new(
        CalendarStats { year, month, days },
        "Calendar stats retrieved successfully.",
    )))
}

fn validate_content(raw: &str) -> Result<String, AppError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::validation("content must not be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::validation(format!(
            "content must be at most {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(content.to_string())
}

fn validate_score(score: i64) -> Result<u8, AppError> {
    if !(i64::from(stats::SCORE_MIN)..=i64::from(stats::SCORE_MAX)).contains(&score) {
        return Err(AppError::validation(format!(
            "score must be between {} and {}",
            stats::SCORE_MIN,
            stats::SCORE_MAX
        )));
    }
    Ok(score as u8)
}
