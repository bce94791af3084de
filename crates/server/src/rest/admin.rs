use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};

use crate::audit;
use crate::auth::extractors::{require_role, AuthRequired};
use crate::repo;
use shared_types::{
    AppError, CreateUserRequest, Role, UpdateUserRequest, UserEnvelope, UsersEnvelope, UserView,
};

// ---------------------------------------------------------------------------
// GET /api/admin/users
// ---------------------------------------------------------------------------

/// List all user accounts with their creator's username resolved.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = UsersEnvelope),
        (status = 403, description = "Superadmin role required", body = AppError)
    ),
    tag = "admin"
)]
pub async fn list_users(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<UsersEnvelope>, AppError> {
    require_role(&auth.0, Role::Superadmin)?;

    let users = repo::user::list(&pool).await?;

    let mut creator_ids: Vec<i64> = users.iter().filter_map(|u| u.created_by).collect();
    creator_ids.sort_unstable();
    creator_ids.dedup();
    let creators = repo::user::summaries_by_ids(&pool, &creator_ids).await?;

    let views = users
        .into_iter()
        .map(|u| {
            let created_by_username = u.created_by.map(|id| {
                creators
                    .get(&id)
                    .map(|c| c.username.clone())
                    .unwrap_or_else(|| "Unknown".to_string())
            });
            UserView {
                created_by_username,
                ..UserView::from(u)
            }
        })
        .collect();

    Ok(Json(UsersEnvelope { users: views }))
}

// ---------------------------------------------------------------------------
// POST /api/admin/users
// ---------------------------------------------------------------------------

/// Create a user account.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Missing fields or invalid role", body = AppError),
        (status = 403, description = "Superadmin role required", body = AppError),
        (status = 409, description = "Username already exists", body = AppError)
    ),
    tag = "admin"
)]
pub async fn create_user(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    require_role(&auth.0, Role::Superadmin)?;

    let (user, events) = repo::user::create(&pool, &auth.0, body).await?;
    audit::dispatch(&pool, events);

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: UserView::from(user),
        }),
    ))
}

// ---------------------------------------------------------------------------
// PATCH /api/admin/users/{id}
// ---------------------------------------------------------------------------

/// Update a user's role, active flag, profile name, or password.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 400, description = "No updates provided or invalid role", body = AppError),
        (status = 403, description = "Superadmin role required", body = AppError),
        (status = 404, description = "User not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn update_user(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    require_role(&auth.0, Role::Superadmin)?;

    let (user, events) = repo::user::update(&pool, &auth.0, id, body).await?;
    audit::dispatch(&pool, events);

    Ok(Json(UserEnvelope {
        user: UserView::from(user),
    }))
}
