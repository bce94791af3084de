pub mod admin;
pub mod auth;
pub mod branch;
pub mod close_request;
pub mod exec_case;
pub mod rpp_case;
pub mod statistics;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;

use crate::db::AppState;
use crate::rate_limit::{rate_limit_middleware, RateLimitState};

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
}

fn domain_routes() -> Router<AppState> {
    Router::new()
        // Admin user management
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/api/admin/users/{id}", patch(admin::update_user))
        // Investigation cases (exec desk)
        .route(
            "/api/cases",
            get(exec_case::list_cases).post(exec_case::create_case),
        )
        .route("/api/cases/review", get(exec_case::list_cases_for_review))
        .route(
            "/api/cases/{id}",
            get(exec_case::get_case).put(exec_case::update_case),
        )
        .route("/api/cases/{id}/close", patch(exec_case::close_case))
        .route("/api/users/exec", get(exec_case::list_exec_users))
        // Close requests
        .route(
            "/api/close-requests",
            get(close_request::list_close_requests).post(close_request::raise_close_request),
        )
        .route(
            "/api/close-requests/review",
            get(close_request::list_close_requests_for_review),
        )
        .route(
            "/api/close-requests/{id}",
            patch(close_request::review_close_request),
        )
        // Incoming reports (officer desk)
        .route(
            "/api/rpp-cases",
            get(rpp_case::list_rpp_cases).post(rpp_case::create_rpp_case),
        )
        .route(
            "/api/rpp-cases/review",
            get(rpp_case::list_rpp_cases_for_review),
        )
        .route(
            "/api/rpp-cases/{id}",
            get(rpp_case::get_rpp_case).put(rpp_case::update_rpp_case),
        )
        // Statistics (senior desk)
        .route("/api/statistics", get(statistics::get_statistics))
        // Branch master
        .route("/api/branches", get(branch::list_branches))
        .route("/api/branches/{code}", get(branch::get_branch))
}

/// 404 fallback in the same `{"error": ...}` shape as everything else.
async fn not_found() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}

/// Build the combined REST API router.
pub fn api_router() -> Router<AppState> {
    domain_routes().merge(auth_routes()).fallback(not_found)
}

/// Build the REST API router with rate limiting applied: a global window
/// over everything, plus a stricter window on the auth routes.
pub fn api_router_with_rate_limit(
    global: RateLimitState,
    auth_limit: RateLimitState,
) -> Router<AppState> {
    domain_routes()
        .merge(auth_routes().layer(axum::middleware::from_fn_with_state(
            auth_limit,
            rate_limit_middleware,
        )))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            global,
            rate_limit_middleware,
        ))
}
