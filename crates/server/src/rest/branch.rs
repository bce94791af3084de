use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::{Pool, Postgres};

use crate::auth::extractors::AuthRequired;
use crate::repo;
use shared_types::{AppError, BranchEnvelope, BranchesEnvelope};

// ---------------------------------------------------------------------------
// GET /api/branches
// ---------------------------------------------------------------------------

/// List the branch master, ordered by code. Open to any authenticated role.
#[utoipa::path(
    get,
    path = "/api/branches",
    responses(
        (status = 200, description = "All branches", body = BranchesEnvelope),
        (status = 401, description = "Authentication required", body = AppError)
    ),
    tag = "branches"
)]
pub async fn list_branches(
    State(pool): State<Pool<Postgres>>,
    _auth: AuthRequired,
) -> Result<Json<BranchesEnvelope>, AppError> {
    let branches = repo::branch::list(&pool).await?;
    Ok(Json(BranchesEnvelope { branches }))
}

// ---------------------------------------------------------------------------
// GET /api/branches/{code}
// ---------------------------------------------------------------------------

/// Look up a branch by its code.
#[utoipa::path(
    get,
    path = "/api/branches/{code}",
    params(("code" = String, Path, description = "Branch code")),
    responses(
        (status = 200, description = "Branch found", body = BranchEnvelope),
        (status = 404, description = "Branch not found", body = AppError)
    ),
    tag = "branches"
)]
pub async fn get_branch(
    State(pool): State<Pool<Postgres>>,
    _auth: AuthRequired,
    Path(code): Path<String>,
) -> Result<Json<BranchEnvelope>, AppError> {
    let branch = repo::branch::find_by_code(&pool, &code)
        .await?
        .ok_or_else(|| AppError::not_found("Branch not found"))?;

    Ok(Json(BranchEnvelope { branch }))
}
