use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use redis::Client as RedisClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dropin_api::{
    config::Config,
    db,
    middleware::auth::JwtSecret,
    routes,
    services::{auto_meals, metrics},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_async_connection().await?;
    info!("Redis connected");

    metrics::start(pool.clone());
    auto_meals::start(pool.clone(), config.report_tz);

    let state = AppState {
        db: pool,
        redis: redis_conn,
        config: config.clone(),
    };

    // CORS: the app base URL plus localhost for development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/change-password", post(routes::auth::change_password))
        // Guests
        .route("/guests", get(routes::guests::list_guests).post(routes::guests::create_guest))
        .route("/guests/recent", get(routes::guests::recent_guests))
        .route("/guests/{id}", get(routes::guests::get_guest).put(routes::guests::update_guest).delete(routes::guests::delete_guest))
        // Guest reminders
        .route("/guests/{id}/reminders", get(routes::reminders::list_reminders).post(routes::reminders::add_reminder))
        .route("/guests/{id}/reminders/active", get(routes::reminders::active_reminders))
        .route("/reminders/{id}/dismiss", post(routes::reminders::dismiss_reminder))
        .route("/reminders/{id}", delete(routes::reminders::delete_reminder))
        // Meals
        .route("/meals", get(routes::meals::list_meals).post(routes::meals::log_guest_meal).delete(routes::meals::delete_bulk_meals))
        .route("/meals/batch", post(routes::meals::add_batch_meals))
        .route("/meals/{id}", delete(routes::meals::delete_meal))
        // Bookings (shower / laundry slots)
        .route("/bookings/{service}/board", get(routes::bookings::slot_board))
        .route("/bookings/{service}", post(routes::bookings::create_booking))
        .route("/bookings/{service}/next-available", post(routes::bookings::book_next_available))
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel_booking))
        // Blocked slots
        .route("/blocked-slots/{service}", get(routes::blocked_slots::list_blocked))
        .route("/blocked-slots", post(routes::blocked_slots::block_slot).delete(routes::blocked_slots::unblock_slot))
        // Bicycle repairs
        .route("/bicycles", get(routes::bicycles::repair_queue).post(routes::bicycles::create_repair))
        .route("/bicycles/{id}/complete", post(routes::bicycles::complete_repair))
        .route("/bicycles/{id}", delete(routes::bicycles::delete_repair))
        // Reports
        .route("/reports/trend", get(routes::reports::trend))
        .route("/reports/summary", get(routes::reports::summary))
        .route("/reports/summary/export.csv", get(routes::reports::export_summary_csv))
        .route("/reports/pdf", get(routes::reports::pdf))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("drop-in API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
