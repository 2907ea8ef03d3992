use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/records",
            post(handlers::create_record).get(handlers::list_records),
        )
        .route(
            "/api/records/:id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route("/api/stats/summary", get(handlers::stats_summary))
        .route("/api/stats/weekly", get(handlers::stats_weekly))
        .route("/api/stats/distribution", get(handlers::stats_distribution))
        .route("/api/stats/calendar", get(handlers::stats_calendar))
        .with_state(state)
}
