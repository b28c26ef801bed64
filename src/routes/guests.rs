use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::AuthenticatedStaff,
        guest::{CreateGuestRequest, UpdateGuestRequest},
        user::UserRole,
    },
    services::guests::GuestService,
    AppState,
};

/// Only admin and staff may edit the guest roster; check-in stations read it.
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

pub async fn list_guests(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    GuestService::list(&state.db)
        .await
        .map(|g| Json(serde_json::to_value(g).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

/// Quick list for the check-in screen: guests with meal activity in the last
/// seven civil days.
pub async fn recent_guests(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    GuestService::recent(&state.db, state.config.report_tz, Utc::now())
        .await
        .map(|g| Json(serde_json::to_value(g).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn get_guest(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match GuestService::get(&state.db, id).await {
        Ok(Some(guest)) => Ok(Json(serde_json::to_value(guest).unwrap())),
        Ok(None) => Err((StatusCode::NOT_FOUND, Json(json!({ "error": "Guest not found" })))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

pub async fn create_guest(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(body): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    GuestService::create(&state.db, &body)
        .await
        .map(|guest| (StatusCode::CREATED, Json(serde_json::to_value(guest).unwrap())))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn update_guest(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateGuestRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    GuestService::update(&state.db, id, &body)
        .await
        .map(|guest| Json(serde_json::to_value(guest).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn delete_guest(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_admin(&staff) {
        return Err(err);
    }

    GuestService::delete(&state.db, id)
        .await
        .map(|_| Json(json!({ "message": "Guest deleted" })))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}
