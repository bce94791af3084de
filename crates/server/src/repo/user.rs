use shared_types::{AppError, CreateUserRequest, Role, UpdateUserRequest, User, UserSummary};
use sqlx::{Pool, Postgres};
use std::collections::HashMap;

use crate::audit::{actions, AuditEvent};
use crate::auth::extractors::Actor;
use crate::auth::password;
use crate::error_convert::SqlxErrorExt;

const USER_COLUMNS: &str = "id, username, password_hash, role, full_name, is_active, \
     last_login, created_by, created_at";

/// Display name for a user reference: profile name, falling back to the
/// account name.
pub fn display_name(user: &UserSummary) -> String {
    user.full_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&user.username)
        .to_string()
}

pub async fn find_by_username(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username.to_lowercase())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List all users, newest first.
pub async fn list(pool: &Pool<Postgres>) -> Result<Vec<User>, AppError> {
    let rows = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Active exec-capable users, for the PIC dropdown.
pub async fn list_exec_capable(pool: &Pool<Postgres>) -> Result<Vec<UserSummary>, AppError> {
    let rows = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, username, full_name
        FROM users
        WHERE role IN ('exec', 'superadmin') AND is_active
        ORDER BY full_name NULLS LAST, username
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Resolve a set of user ids to summaries for display-name annotation.
pub async fn summaries_by_ids(
    pool: &Pool<Postgres>,
    ids: &[i64],
) -> Result<HashMap<i64, UserSummary>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, UserSummary>(
        "SELECT id, username, full_name FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}

/// Stamp the last successful login. Best-effort.
pub async fn touch_last_login(pool: &Pool<Postgres>, id: i64) {
    let result = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await;
    if let Err(err) = result {
        log::warn!("failed to stamp last_login for user {id}: {err}");
    }
}

/// Create a user account. Superadmin-gated at the route layer.
pub async fn create(
    pool: &Pool<Postgres>,
    actor: &Actor,
    req: CreateUserRequest,
) -> Result<(User, Vec<AuditEvent>), AppError> {
    let username = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Username, password, and role are required"))?
        .to_lowercase();
    let plain = req
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Username, password, and role are required"))?;
    let role = req
        .role
        .as_deref()
        .ok_or_else(|| AppError::validation("Username, password, and role are required"))
        .and_then(|r| Role::parse(r).ok_or_else(|| AppError::validation("Invalid role")))?;

    // Friendly pre-check; the unique constraint is the real guard.
    if find_by_username(pool, &username).await?.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = password::hash_password(plain)
        .map_err(|_| AppError::internal("Failed to hash password"))?;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, password_hash, role, full_name, is_active, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&username)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(&req.full_name)
    .bind(req.is_active.unwrap_or(true))
    .bind(actor.id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::CREATE_USER,
        "user",
        user.id,
        serde_json::json!({ "username": user.username.clone(), "role": user.role.clone() }),
    )];

    Ok((user, events))
}

/// Patch a user account (role, active flag, password reset, profile name).
pub async fn update(
    pool: &Pool<Postgres>,
    actor: &Actor,
    id: i64,
    req: UpdateUserRequest,
) -> Result<(User, Vec<AuditEvent>), AppError> {
    let role = match req.role.as_deref() {
        Some(r) => Some(
            Role::parse(r)
                .ok_or_else(|| AppError::validation("Invalid role"))?
                .as_str(),
        ),
        None => None,
    };

    let password_hash = match req.password.as_deref().filter(|s| !s.is_empty()) {
        Some(plain) => Some(
            password::hash_password(plain)
                .map_err(|_| AppError::internal("Failed to hash password"))?,
        ),
        None => None,
    };

    let mut patched: Vec<&str> = Vec::new();
    if role.is_some() {
        patched.push("role");
    }
    if req.is_active.is_some() {
        patched.push("is_active");
    }
    if password_hash.is_some() {
        patched.push("password");
    }
    if req.full_name.is_some() {
        patched.push("full_name");
    }
    if patched.is_empty() {
        return Err(AppError::bad_request("No updates provided"));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            role          = COALESCE($2, role),
            is_active     = COALESCE($3, is_active),
            password_hash = COALESCE($4, password_hash),
            full_name     = COALESCE($5, full_name)
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(role)
    .bind(req.is_active)
    .bind(password_hash)
    .bind(&req.full_name)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::UPDATE_USER,
        "user",
        id,
        serde_json::json!({ "updates": patched }),
    )];

    Ok((user, events))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(username: &str, full_name: Option<&str>) -> UserSummary {
        UserSummary {
            id: 1,
            username: username.into(),
            full_name: full_name.map(Into::into),
        }
    }

    #[test]
    fn display_name_prefers_profile_name() {
        assert_eq!(display_name(&summary("amira", Some("Amira Binti"))), "Amira Binti");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(display_name(&summary("amira", None)), "amira");
        assert_eq!(display_name(&summary("amira", Some("  "))), "amira");
    }
}
