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
    AppError, CaseEnvelope, CasesEnvelope, CloseCaseRequest, CreateCaseRequest, Role,
    UpdateCaseRequest, UserSummariesEnvelope,
};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct CaseListParams {
    /// Case-insensitive substring match on the case code.
    #[serde(default)]
    pub search: Option<String>,
    /// When true, lifts the default PIC scoping (search/all mode).
    #[serde(default)]
    pub all: Option<bool>,
}

// ---------------------------------------------------------------------------
// GET /api/cases
// ---------------------------------------------------------------------------

/// List investigation cases. The default view is scoped to cases where
/// the caller is PIC; `all=true` shows everything.
#[utoipa::path(
    get,
    path = "/api/cases",
    params(CaseListParams),
    responses(
        (status = 200, description = "Cases", body = CasesEnvelope),
        (status = 403, description = "Exec role required", body = AppError)
    ),
    tag = "cases"
)]
pub async fn list_cases(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Query(params): Query<CaseListParams>,
) -> Result<Json<CasesEnvelope>, AppError> {
    require_role(&auth.0, Role::Exec)?;

    let scope_pic = if params.all.unwrap_or(false) {
        None
    } else {
        Some(auth.0.id)
    };

    let cases = repo::exec_case::list(&pool, scope_pic, params.search.as_deref()).await?;
    let cases = repo::exec_case::resolve_views(&pool, cases).await?;

    Ok(Json(CasesEnvelope { cases }))
}

// ---------------------------------------------------------------------------
// GET /api/cases/review
// ---------------------------------------------------------------------------

/// Read-only view of all investigation cases for the senior desk.
#[utoipa::path(
    get,
    path = "/api/cases/review",
    responses(
        (status = 200, description = "All cases", body = CasesEnvelope),
        (status = 403, description = "Senior role required", body = AppError)
    ),
    tag = "cases"
)]
pub async fn list_cases_for_review(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<CasesEnvelope>, AppError> {
    require_role(&auth.0, Role::Senior)?;

    let cases = repo::exec_case::list(&pool, None, None).await?;
    let cases = repo::exec_case::resolve_views(&pool, cases).await?;

    Ok(Json(CasesEnvelope { cases }))
}

// ---------------------------------------------------------------------------
// GET /api/cases/{id}
// ---------------------------------------------------------------------------

/// Get a single investigation case.
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    params(("id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case found", body = CaseEnvelope),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn get_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<CaseEnvelope>, AppError> {
    require_role(&auth.0, Role::Exec)?;

    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let case = repo::exec_case::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;
    let case = repo::exec_case::resolve_view(&pool, case).await?;

    Ok(Json(CaseEnvelope { case }))
}

// ---------------------------------------------------------------------------
// POST /api/cases
// ---------------------------------------------------------------------------

/// Create an investigation case. Status starts at WIP regardless of input.
#[utoipa::path(
    post,
    path = "/api/cases",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = CaseEnvelope),
        (status = 400, description = "Missing required fields", body = AppError),
        (status = 403, description = "Exec role required", body = AppError),
        (status = 409, description = "Case ID already exists", body = AppError)
    ),
    tag = "cases"
)]
pub async fn create_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Json(body): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<CaseEnvelope>), AppError> {
    require_role(&auth.0, Role::Exec)?;

    let (case, events) = repo::exec_case::create(&pool, &auth.0, body).await?;
    audit::dispatch(&pool, events);

    let case = repo::exec_case::resolve_view(&pool, case).await?;
    Ok((StatusCode::CREATED, Json(CaseEnvelope { case })))
}

// ---------------------------------------------------------------------------
// PUT /api/cases/{id}
// ---------------------------------------------------------------------------

/// Apply a partial update to a case.
#[utoipa::path(
    put,
    path = "/api/cases/{id}",
    params(("id" = String, Path, description = "Case UUID")),
    request_body = UpdateCaseRequest,
    responses(
        (status = 200, description = "Case updated", body = CaseEnvelope),
        (status = 403, description = "Exec role required", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn update_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateCaseRequest>,
) -> Result<Json<CaseEnvelope>, AppError> {
    require_role(&auth.0, Role::Exec)?;

    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let (case, events) = repo::exec_case::update(&pool, &auth.0, uuid, body).await?;
    audit::dispatch(&pool, events);

    let case = repo::exec_case::resolve_view(&pool, case).await?;
    Ok(Json(CaseEnvelope { case }))
}

// ---------------------------------------------------------------------------
// PATCH /api/cases/{id}/close
// ---------------------------------------------------------------------------

/// Close a case directly. Allowed only for the case's current PIC;
/// superadmin is not exempt from this check.
#[utoipa::path(
    patch,
    path = "/api/cases/{id}/close",
    params(("id" = String, Path, description = "Case UUID")),
    request_body = CloseCaseRequest,
    responses(
        (status = 200, description = "Case closed", body = CaseEnvelope),
        (status = 403, description = "Caller is not the PIC", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn close_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
    Json(body): Json<CloseCaseRequest>,
) -> Result<Json<CaseEnvelope>, AppError> {
    require_role(&auth.0, Role::Exec)?;

    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let (case, events) = repo::exec_case::close_directly(&pool, &auth.0, uuid, body).await?;
    audit::dispatch(&pool, events);

    let case = repo::exec_case::resolve_view(&pool, case).await?;
    Ok(Json(CaseEnvelope { case }))
}

// ---------------------------------------------------------------------------
// GET /api/users/exec
// ---------------------------------------------------------------------------

/// Active exec-capable users, for the PIC dropdown.
#[utoipa::path(
    get,
    path = "/api/users/exec",
    responses(
        (status = 200, description = "Exec-capable users", body = UserSummariesEnvelope),
        (status = 403, description = "Exec role required", body = AppError)
    ),
    tag = "cases"
)]
pub async fn list_exec_users(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<UserSummariesEnvelope>, AppError> {
    require_role(&auth.0, Role::Exec)?;

    let users = repo::user::list_exec_capable(&pool).await?;
    Ok(Json(UserSummariesEnvelope { users }))
}
