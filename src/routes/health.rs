use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness probe: the API is only healthy when Postgres answers. Redis
/// status is reported but non-fatal (only login throttling depends on it).
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut redis = state.redis.clone();
    let pong: Result<String, _> = redis::cmd("PING").query_async(&mut redis).await;
    let redis_status = match pong {
        Ok(_) => "connected",
        Err(_) => "unavailable",
    };

    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected", "redis": redis_status })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "db": e.to_string(), "redis": redis_status })),
        ),
    }
}
