use axum::{http::StatusCode, Json};
use serde_json::json;

/// Login throttle: attempts allowed per identifier within one window.
pub const LOGIN_MAX_ATTEMPTS: u64 = 5;
pub const LOGIN_WINDOW_SECS: u64 = 900;

/// Redis counter key for a throttled login identifier. Emails are trimmed
/// and case-folded so "Staff@Example" and "staff@example" share a counter.
pub fn login_key(email: &str) -> String {
    format!("rate:login:{}", email.trim().to_lowercase())
}

/// Fixed-window counter in Redis: INCR the key, arm the TTL on the first
/// hit only, reject once the count passes the limit. A Redis outage fails
/// open — the endpoint keeps working without throttling.
pub async fn check_rate_limit(
    redis: &mut redis::aio::MultiplexedConnection,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    let count: u64 = redis::cmd("INCR")
        .arg(key)
        .query_async(redis)
        .await
        .unwrap_or(0);

    if count == 1 {
        // Arm the window only when the counter is created; re-arming on
        // every attempt would keep a steady trickle throttled forever.
        let _: Result<(), _> = redis::cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .query_async(redis)
            .await;
    }

    if count > max_attempts {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many attempts. Try again in a few minutes." })),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_key_folds_case_and_whitespace() {
        assert_eq!(login_key("Staff@Example.org"), "rate:login:staff@example.org");
        assert_eq!(login_key("  staff@example.org "), "rate:login:staff@example.org");
    }
}
