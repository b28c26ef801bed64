use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{auth::AuthenticatedStaff, bicycle::CreateBicycleRequest, user::UserRole},
    services::{
        bicycles::{BicycleError, BicycleService},
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

pub async fn repair_queue(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    BicycleService::queue(&state.db)
        .await
        .map(|q| Json(serde_json::to_value(q).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn create_repair(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Json(body): Json<CreateBicycleRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    match BicycleService::create(&state.db, &body, Utc::now()).await {
        Ok(record) => {
            metrics::BICYCLE_REPAIRS_COUNTER.inc();
            Ok((StatusCode::CREATED, Json(serde_json::to_value(record).unwrap())))
        }
        Err(e) => {
            let status = match &e {
                BicycleError::GuestBanned => StatusCode::FORBIDDEN,
                BicycleError::NewBicycleTooSoon => StatusCode::CONFLICT,
                BicycleError::GuestNotFound => StatusCode::NOT_FOUND,
                BicycleError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((status, Json(json!({ "error": e.to_string() }))))
        }
    }
}

pub async fn complete_repair(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    BicycleService::complete(&state.db, id)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn delete_repair(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    BicycleService::delete(&state.db, id)
        .await
        .map(|_| Json(json!({ "message": "Repair record deleted" })))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}
