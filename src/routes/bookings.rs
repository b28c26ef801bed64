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
        booking::{CreateBookingRequest, NextAvailableRequest, ServiceType, SlotBoardQuery},
        user::UserRole,
    },
    services::{
        bookings::{BookingError, BookingService},
        civil_date::civil_today,
        metrics,
    },
    AppState,
};

/// The manual slot grid is staff-facing; check-in stations go through the
/// next-available quick action instead.
fn require_staff(staff: &AuthenticatedStaff) -> Option<(StatusCode, Json<Value>)> {
    match staff.role {
        UserRole::Admin | UserRole::Staff => None,
        _ => Some((StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied" })))),
    }
}

fn booking_error_response(e: BookingError) -> (StatusCode, Json<Value>) {
    match &e {
        BookingError::Exhausted { .. } | BookingError::SlotUnavailable { .. } => {
            (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() })))
        }
        BookingError::ConfirmationRequired { active, .. } => (
            StatusCode::CONFLICT,
            Json(json!({ "error": e.to_string(), "active_bookings": active })),
        ),
        BookingError::Db(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

/// The slot board for one service and date: every slot with its status.
pub async fn slot_board(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(service): Path<ServiceType>,
    Query(q): Query<SlotBoardQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    BookingService::board(&state.db, service, q.date)
        .await
        .map(|b| Json(serde_json::to_value(b).unwrap()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}

pub async fn create_booking(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Path(service): Path<ServiceType>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_staff(&staff) {
        return Err(err);
    }

    match BookingService::book(&state.db, service, &body).await {
        Ok(record) => {
            metrics::BOOKINGS_COUNTER.with_label_values(&[&record.service_type]).inc();
            Ok((StatusCode::CREATED, Json(serde_json::to_value(record).unwrap())))
        }
        Err(e) => Err(booking_error_response(e)),
    }
}

/// Check-in quick action: book the earliest open slot of the day.
pub async fn book_next_available(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(service): Path<ServiceType>,
    Json(body): Json<NextAvailableRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let date = body
        .date
        .unwrap_or_else(|| civil_today(Utc::now(), state.config.report_tz));

    match BookingService::book_next_available(&state.db, service, body.guest_id, date).await {
        Ok((record, slot)) => {
            metrics::BOOKINGS_COUNTER.with_label_values(&[&record.service_type]).inc();
            Ok((
                StatusCode::CREATED,
                Json(json!({ "booking": record, "slot": slot })),
            ))
        }
        Err(e) => Err(booking_error_response(e)),
    }
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    _staff: AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    BookingService::cancel(&state.db, id)
        .await
        .map(|_| Json(json!({ "message": "Booking cancelled" })))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
}
