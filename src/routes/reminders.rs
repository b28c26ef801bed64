use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{auth::AuthenticatedStaff, reminder::CreateReminderRequest, user::UserRole},
    services::reminders::ReminderService,
    AppState,
};

fn require_staff(staff: &AuthenticatedStaff) -> Option<(StatusCode, Json<Value>)> {
    match staff.role {
        UserRole::Admin | UserRole::Staff => None,
        _ => Some((StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied" })))),
    }
}

pub async fn list_reminders(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(guest_id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ReminderService::list_for_guest(&state.db, guest_id)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

/// Active reminders only — what the service cards surface at check-in.
pub async fn active_reminders(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(guest_id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ReminderService::active_for_guest(&state.db, guest_id)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn add_reminder(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(guest_id): Path<Uuid>,
    Json(body): Json<CreateReminderRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    ReminderService::add(&state.db, guest_id, &body)
        .await
        .map(|r| (StatusCode::CREATED, Json(serde_json::to_value(r).unwrap())))
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))
}

pub async fn dismiss_reminder(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match ReminderService::dismiss(&state.db, id).await {
        Ok(true) => Ok(Json(json!({ "message": "Reminder dismissed" }))),
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Reminder not found or already dismissed" })),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    match ReminderService::delete(&state.db, id).await {
        Ok(true) => Ok(Json(json!({ "message": "Reminder deleted" }))),
        Ok(false) => Err((StatusCode::NOT_FOUND, Json(json!({ "error": "Reminder not found" })))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}
