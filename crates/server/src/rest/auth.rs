use axum::{extract::State, Json};
use sqlx::{Pool, Postgres};

use crate::audit::{self, actions, AuditEvent};
use crate::auth::extractors::AuthRequired;
use crate::auth::{jwt, password};
use crate::repo;
use shared_types::{AppError, LoginRequest, LoginResponse, UserEnvelope, UserView};

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

/// Validate credentials and issue a session token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = AppError),
        (status = 401, description = "Invalid credentials or disabled account", body = AppError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(pool): State<Pool<Postgres>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = body
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Username and password required"))?;
    let plain = body
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Username and password required"))?;

    let user = repo::user::find_by_username(&pool, username)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(AppError::unauthorized("Account is disabled"));
    }

    let valid = password::verify_password(plain, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    repo::user::touch_last_login(&pool, user.id).await;

    let token = jwt::create_token(user.id, &user.username, &user.role, user.full_name.as_deref())
        .map_err(|err| {
            log::error!("failed to issue token: {err}");
            AppError::internal("Login failed")
        })?;

    audit::dispatch(
        &pool,
        vec![AuditEvent::new(
            user.id,
            actions::LOGIN,
            "user",
            user.id,
            serde_json::json!({ "username": user.username.clone() }),
        )],
    );

    Ok(Json(LoginResponse {
        token,
        user: UserView::from(user),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/auth/me
// ---------------------------------------------------------------------------

/// Validate the session token and return the current account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Missing, invalid, or expired token", body = AppError),
        (status = 404, description = "User no longer exists", body = AppError)
    ),
    tag = "auth"
)]
pub async fn me(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = repo::user::find_by_id(&pool, auth.0.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !user.is_active {
        return Err(AppError::unauthorized("Account is disabled"));
    }

    Ok(Json(UserEnvelope {
        user: UserView::from(user),
    }))
}
