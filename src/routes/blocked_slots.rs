use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::{
        auth::AuthenticatedStaff,
        booking::{BlockSlotRequest, ServiceType, SlotBoardQuery, UnblockSlotQuery},
        user::UserRole,
    },
    services::{
        bookings::{BookingError, BookingService},
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

pub async fn list_blocked(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(service): Path<ServiceType>,
    Query(q): Query<SlotBoardQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    BookingService::blocked_for_date(&state.db, service, q.date)
        .await
        .map(|b| Json(serde_json::to_value(b).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

/// Block a slot. Blocking over active bookings requires `confirm: true`; the
/// 409 response carries the count so the client can ask the operator.
pub async fn block_slot(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(body): Json<BlockSlotRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    match BookingService::block_slot(&state.db, &body).await {
        Ok(blocked) => {
            metrics::SLOT_BLOCKS_COUNTER.inc();
            Ok((StatusCode::CREATED, Json(serde_json::to_value(blocked).unwrap())))
        }
        Err(BookingError::ConfirmationRequired { time, active }) => Err((
            StatusCode::CONFLICT,
            Json(json!({
                "error": format!("slot {time} has {active} active booking(s); confirmation required"),
                "active_bookings": active,
            })),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

pub async fn unblock_slot(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(q): Query<UnblockSlotQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    BookingService::unblock_slot(&state.db, q.service_type, q.date, &q.time)
        .await
        .map(|_| Json(json!({ "message": "Slot unblocked" })))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}
