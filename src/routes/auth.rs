use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    middleware::rate_limit::{check_rate_limit, login_key, LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW_SECS},
    models::{
        auth::AuthenticatedStaff,
        user::{ChangePasswordRequest, LoginRequest},
    },
    services::{auth::AuthService, metrics},
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut redis = state.redis.clone();
    check_rate_limit(
        &mut redis,
        &login_key(&body.email),
        LOGIN_MAX_ATTEMPTS,
        LOGIN_WINDOW_SECS,
    )
    .await?;

    match AuthService::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .await
    {
        Ok(response) => {
            metrics::LOGINS_COUNTER.with_label_values(&["success"]).inc();
            Ok(Json(serde_json::to_value(response).unwrap()))
        }
        Err(e) => {
            metrics::LOGINS_COUNTER.with_label_values(&["failure"]).inc();
            Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": e.to_string() }))))
        }
    }
}

pub async fn me(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    AuthService::profile(&state.db, staff.user_id)
        .await
        .map(|p| Json(serde_json::to_value(p).unwrap()))
        .map_err(|e| (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))))
}

pub async fn change_password(
    State(state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    AuthService::change_password(
        &state.db,
        staff.user_id,
        &body.current_password,
        &body.new_password,
    )
    .await
    .map(|_| Json(json!({ "message": "Password updated" })))
    .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))
}
