use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use server::db::AppState;
use server::rate_limit::RateLimitState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let config = server::config::load();
    server::health::record_start_time();

    let pool = server::db::create_pool();
    server::db::run_migrations(&pool).await;

    let state = AppState { pool };

    let global_limit = RateLimitState::new(config.rate_limit_max, config.rate_limit_window);
    let auth_limit = RateLimitState::new(config.auth_rate_limit_max, config.rate_limit_window);

    let origin = config
        .frontend_origin
        .parse::<HeaderValue>()
        .expect("FRONTEND_ORIGIN must be a valid origin");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = server::rest::api_router_with_rate_limit(global_limit, auth_limit)
        .route("/health", get(server::health::health_check))
        .layer(axum::middleware::from_fn(
            server::auth::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
        .merge(server::openapi::swagger_router());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    log::info!("DFI backend listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server error");
}
