use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Gauge};
use sqlx::PgPool;
use tracing::{info, warn};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_logins_total",
        "Login attempts by status",
        &["status"]
    ).unwrap();

    pub static ref MEALS_LOGGED_COUNTER: CounterVec = register_counter_vec!(
        "api_meals_logged_total",
        "Meal records created, by category",
        &["category"]
    ).unwrap();

    pub static ref BOOKINGS_COUNTER: CounterVec = register_counter_vec!(
        "api_bookings_total",
        "Slot bookings created, by service",
        &["service"]
    ).unwrap();

    pub static ref SLOT_BLOCKS_COUNTER: Counter = register_counter!(
        "api_slot_blocks_total",
        "Slots administratively blocked"
    ).unwrap();

    pub static ref BICYCLE_REPAIRS_COUNTER: Counter = register_counter!(
        "api_bicycle_repairs_total",
        "Bicycle repair requests created"
    ).unwrap();

    // ── Business metrics ────────────────────────────────────────────────────
    pub static ref GUESTS_GAUGE: Gauge = register_gauge!(
        "dropin_guests_total",
        "Registered guests"
    ).unwrap();

    pub static ref MEALS_TODAY_GAUGE: Gauge = register_gauge!(
        "dropin_meal_records_today",
        "Meal records created in the last 24 hours"
    ).unwrap();

    pub static ref PENDING_BICYCLES_GAUGE: Gauge = register_gauge!(
        "dropin_bicycle_repairs_pending",
        "Bicycle repairs waiting in the queue"
    ).unwrap();

    pub static ref ACTIVE_REMINDERS_GAUGE: Gauge = register_gauge!(
        "dropin_reminders_active",
        "Guest reminders not yet dismissed"
    ).unwrap();
}

/// Spawn the background metrics collector (refreshes every 5 minutes).
pub fn start(pool: PgPool) {
    tokio::spawn(async move {
        // Initial collection on startup
        if let Err(e) = collect(&pool).await {
            warn!("Metrics: initial collection failed: {}", e);
        }
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
        }
    });
}

async fn collect(pool: &PgPool) -> anyhow::Result<()> {
    let guests: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM guests")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    GUESTS_GAUGE.set(guests as f64);

    let meals_today: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM meal_records WHERE created_at >= NOW() - INTERVAL '1 day'",
    )
    .fetch_one(pool)
    .await
    .unwrap_or(0);
    MEALS_TODAY_GAUGE.set(meals_today as f64);

    let pending_bicycles: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM bicycle_records WHERE status = 'pending'",
    )
    .fetch_one(pool)
    .await
    .unwrap_or(0);
    PENDING_BICYCLES_GAUGE.set(pending_bicycles as f64);

    let active_reminders: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM guest_reminders WHERE dismissed_at IS NULL",
    )
    .fetch_one(pool)
    .await
    .unwrap_or(0);
    ACTIVE_REMINDERS_GAUGE.set(active_reminders as f64);

    info!(
        "Metrics: {guests} guests, {meals_today} meal records today, \
         {pending_bicycles} pending repairs, {active_reminders} active reminders"
    );
    Ok(())
}
