use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    models::{auth::AuthenticatedStaff, meal::MonthQuery},
    services::civil_date::civil_today,
    services::reports::{summary_csv, ReportService},
    AppState,
};

fn internal_error(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
}

/// Month trend: per-category totals plus the daily series for the chart.
pub async fn trend(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ReportService::trend(&state.db, state.config.report_tz, q.year, q.month)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap()))
        .map_err(internal_error)
}

/// The printable report figures, with RV and shelter combined.
pub async fn pdf(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ReportService::pdf(&state.db, state.config.report_tz, q.year, q.month)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap()))
        .map_err(internal_error)
}

pub async fn summary(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let today = civil_today(Utc::now(), state.config.report_tz);
    ReportService::summary(&state.db, state.config.report_tz, q.year, q.month, today)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap()))
        .map_err(internal_error)
}

/// CSV download of the monthly summary.
pub async fn export_summary_csv(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Query(q): Query<MonthQuery>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let today = civil_today(Utc::now(), state.config.report_tz);
    let summary =
        ReportService::summary(&state.db, state.config.report_tz, q.year, q.month, today)
            .await
            .map_err(internal_error)?;
    let csv = summary_csv(&summary).map_err(internal_error)?;

    let filename = format!("meal-summary-{}-{:02}.csv", q.year, q.month + 1);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(csv))
        .map_err(|e| internal_error(e.into()))
}
