use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::audit;
use crate::auth::extractors::{require_role, AuthRequired};
use crate::repo;
use shared_types::{
    AppError, CloseRequestEnvelope, CloseRequestViewsEnvelope, CloseRequestsEnvelope,
    RaiseCloseRequest, ReviewCloseRequest, Role,
};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct CloseRequestListParams {
    /// Optional status filter (Pending, Approved, Rejected).
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /api/close-requests
// ---------------------------------------------------------------------------

/// Raise a close request against an existing case. The case context is
/// snapshotted into the request at this point.
#[utoipa::path(
    post,
    path = "/api/close-requests",
    request_body = RaiseCloseRequest,
    responses(
        (status = 201, description = "Close request raised", body = CloseRequestEnvelope),
        (status = 400, description = "Missing case reference", body = AppError),
        (status = 403, description = "Exec role required", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "close-requests"
)]
pub async fn raise_close_request(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Json(body): Json<RaiseCloseRequest>,
) -> Result<(StatusCode, Json<CloseRequestEnvelope>), AppError> {
    require_role(&auth.0, Role::Exec)?;

    let (request, events) = repo::close_request::raise(&pool, &auth.0, body).await?;
    audit::dispatch(&pool, events);

    Ok((StatusCode::CREATED, Json(CloseRequestEnvelope { request })))
}

// ---------------------------------------------------------------------------
// GET /api/close-requests
// ---------------------------------------------------------------------------

/// List the caller's own close requests.
#[utoipa::path(
    get,
    path = "/api/close-requests",
    params(CloseRequestListParams),
    responses(
        (status = 200, description = "Close requests", body = CloseRequestsEnvelope),
        (status = 403, description = "Exec role required", body = AppError)
    ),
    tag = "close-requests"
)]
pub async fn list_close_requests(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Query(params): Query<CloseRequestListParams>,
) -> Result<Json<CloseRequestsEnvelope>, AppError> {
    require_role(&auth.0, Role::Exec)?;

    let requests =
        repo::close_request::list_by_requester(&pool, auth.0.id, params.status.as_deref())
            .await?;

    Ok(Json(CloseRequestsEnvelope { requests }))
}

// ---------------------------------------------------------------------------
// GET /api/close-requests/review
// ---------------------------------------------------------------------------

/// The senior review queue: every close request, with requester names.
#[utoipa::path(
    get,
    path = "/api/close-requests/review",
    responses(
        (status = 200, description = "All close requests", body = CloseRequestViewsEnvelope),
        (status = 403, description = "Senior role required", body = AppError)
    ),
    tag = "close-requests"
)]
pub async fn list_close_requests_for_review(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<CloseRequestViewsEnvelope>, AppError> {
    require_role(&auth.0, Role::Senior)?;

    let requests = repo::close_request::list_for_review(&pool).await?;
    Ok(Json(CloseRequestViewsEnvelope { requests }))
}

// ---------------------------------------------------------------------------
// PATCH /api/close-requests/{id}
// ---------------------------------------------------------------------------

/// Approve or reject a pending close request. Approval also closes the
/// referenced case, using the remarks/resolution stored on the request.
#[utoipa::path(
    patch,
    path = "/api/close-requests/{id}",
    params(("id" = String, Path, description = "Close request UUID")),
    request_body = ReviewCloseRequest,
    responses(
        (status = 200, description = "Request reviewed", body = CloseRequestEnvelope),
        (status = 400, description = "Invalid status or missing senior remark", body = AppError),
        (status = 403, description = "Senior role required", body = AppError),
        (status = 404, description = "Request not found", body = AppError),
        (status = 409, description = "Request already reviewed", body = AppError)
    ),
    tag = "close-requests"
)]
pub async fn review_close_request(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
    Json(body): Json<ReviewCloseRequest>,
) -> Result<Json<CloseRequestEnvelope>, AppError> {
    require_role(&auth.0, Role::Senior)?;

    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let (request, events) = repo::close_request::review(&pool, &auth.0, uuid, body).await?;
    audit::dispatch(&pool, events);

    Ok(Json(CloseRequestEnvelope { request }))
}
