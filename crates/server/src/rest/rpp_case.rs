use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::audit;
use crate::auth::extractors::{require_role, AuthRequired};
use crate::repo;
use shared_types::{
    AppError, CreateRppCaseRequest, Role, RppCaseEnvelope, RppCasesEnvelope, UpdateRppCaseRequest,
};

// ---------------------------------------------------------------------------
// GET /api/rpp-cases
// ---------------------------------------------------------------------------

/// List incoming reports, newest first.
#[utoipa::path(
    get,
    path = "/api/rpp-cases",
    responses(
        (status = 200, description = "RPP cases", body = RppCasesEnvelope),
        (status = 403, description = "Officer role required", body = AppError)
    ),
    tag = "rpp-cases"
)]
pub async fn list_rpp_cases(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<RppCasesEnvelope>, AppError> {
    require_role(&auth.0, Role::Officer)?;

    let cases = repo::rpp_case::list(&pool).await?;
    Ok(Json(RppCasesEnvelope { cases }))
}

// ---------------------------------------------------------------------------
// GET /api/rpp-cases/review
// ---------------------------------------------------------------------------

/// Read-only view of all incoming reports for the senior desk.
#[utoipa::path(
    get,
    path = "/api/rpp-cases/review",
    responses(
        (status = 200, description = "RPP cases", body = RppCasesEnvelope),
        (status = 403, description = "Senior role required", body = AppError)
    ),
    tag = "rpp-cases"
)]
pub async fn list_rpp_cases_for_review(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<RppCasesEnvelope>, AppError> {
    require_role(&auth.0, Role::Senior)?;

    let cases = repo::rpp_case::list(&pool).await?;
    Ok(Json(RppCasesEnvelope { cases }))
}

// ---------------------------------------------------------------------------
// GET /api/rpp-cases/{id}
// ---------------------------------------------------------------------------

/// Get a single incoming report.
#[utoipa::path(
    get,
    path = "/api/rpp-cases/{id}",
    params(("id" = String, Path, description = "RPP case UUID")),
    responses(
        (status = 200, description = "RPP case found", body = RppCaseEnvelope),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "rpp-cases"
)]
pub async fn get_rpp_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<RppCaseEnvelope>, AppError> {
    require_role(&auth.0, Role::Officer)?;

    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let case = repo::rpp_case::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found("RPP case not found"))?;

    Ok(Json(RppCaseEnvelope { case }))
}

// ---------------------------------------------------------------------------
// POST /api/rpp-cases
// ---------------------------------------------------------------------------

/// Log an incoming report, enforcing the duplicate-BMID and fund-field
/// rules.
#[utoipa::path(
    post,
    path = "/api/rpp-cases",
    request_body = CreateRppCaseRequest,
    responses(
        (status = 201, description = "RPP case created", body = RppCaseEnvelope),
        (status = 400, description = "Missing BMID/source type or fund-field violation", body = AppError),
        (status = 403, description = "Officer role required", body = AppError),
        (status = 409, description = "Duplicate entry for this BMID", body = AppError)
    ),
    tag = "rpp-cases"
)]
pub async fn create_rpp_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Json(body): Json<CreateRppCaseRequest>,
) -> Result<(StatusCode, Json<RppCaseEnvelope>), AppError> {
    require_role(&auth.0, Role::Officer)?;

    let (case, events) = repo::rpp_case::create(&pool, &auth.0, body).await?;
    audit::dispatch(&pool, events);

    Ok((StatusCode::CREATED, Json(RppCaseEnvelope { case })))
}

// ---------------------------------------------------------------------------
// PUT /api/rpp-cases/{id}
// ---------------------------------------------------------------------------

/// Apply a partial update, re-running the duplicate and fund rules.
#[utoipa::path(
    put,
    path = "/api/rpp-cases/{id}",
    params(("id" = String, Path, description = "RPP case UUID")),
    request_body = UpdateRppCaseRequest,
    responses(
        (status = 200, description = "RPP case updated", body = RppCaseEnvelope),
        (status = 400, description = "Fund-field violation", body = AppError),
        (status = 403, description = "Officer role required", body = AppError),
        (status = 404, description = "Not found", body = AppError),
        (status = 409, description = "Duplicate entry for this BMID", body = AppError)
    ),
    tag = "rpp-cases"
)]
pub async fn update_rpp_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateRppCaseRequest>,
) -> Result<Json<RppCaseEnvelope>, AppError> {
    require_role(&auth.0, Role::Officer)?;

    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let (case, events) = repo::rpp_case::update(&pool, &auth.0, uuid, body).await?;
    audit::dispatch(&pool, events);

    Ok(Json(RppCaseEnvelope { case }))
}
