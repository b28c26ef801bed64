use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::AuthenticatedStaff,
        meal::{BatchMealRequest, BulkDeleteQuery, LogGuestMealRequest, MonthQuery},
        user::UserRole,
    },
    services::{
        meals::{MealError, MealService},
        metrics,
    },
    AppState,
};

fn require_staff(staff: &AuthenticatedStaff) -> Option<(StatusCode, Json<Value>)> {
    match staff.role {
        UserRole::Admin | UserRole::Staff => None,
        _ => Some((StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied" })))),
    }
}

fn require_admin(staff: &AuthenticatedStaff) -> Option<(StatusCode, Json<Value>)> {
    match staff.role {
        UserRole::Admin => None,
        _ => Some((StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied" })))),
    }
}

fn meal_error_response(e: MealError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        MealError::DailyLimit { .. } => StatusCode::CONFLICT,
        MealError::NotABatchCategory(_) | MealError::NotAGuestCategory(_) => {
            StatusCode::BAD_REQUEST
        }
        MealError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

pub async fn list_meals(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MealService::list_for_month(&state.db, q.year, q.month)
        .await
        .map(|m| Json(serde_json::to_value(m).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

/// Log a base or extra meal against a checked-in guest. Any staff role may do
/// this; the daily limits are enforced in the service.
pub async fn log_guest_meal(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Json(body): Json<LogGuestMealRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    match MealService::log_guest_meal(&state.db, state.config.report_tz, &body, Utc::now()).await {
        Ok(record) => {
            metrics::MEALS_LOGGED_COUNTER.with_label_values(&[&record.category]).inc();
            Ok((StatusCode::CREATED, Json(serde_json::to_value(record).unwrap())))
        }
        Err(e) => Err(meal_error_response(e)),
    }
}

pub async fn add_batch_meals(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(body): Json<BatchMealRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    match MealService::add_batch(&state.db, state.config.report_tz, &body, Utc::now()).await {
        Ok(record) => {
            metrics::MEALS_LOGGED_COUNTER.with_label_values(&[&record.category]).inc();
            Ok((StatusCode::CREATED, Json(serde_json::to_value(record).unwrap())))
        }
        Err(e) => Err(meal_error_response(e)),
    }
}

pub async fn delete_meal(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    MealService::delete(&state.db, id)
        .await
        .map(|_| Json(json!({ "message": "Meal record deleted" })))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

/// Delete every record of one category in one month. Admin-only; reports the
/// per-record outcome rather than all-or-nothing.
pub async fn delete_bulk_meals(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(q): Query<BulkDeleteQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_admin(&staff) {
        return Err(err);
    }

    MealService::delete_bulk(&state.db, state.config.report_tz, q.category, q.year, q.month)
        .await
        .map(|outcome| Json(serde_json::to_value(outcome).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}
