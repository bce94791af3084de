use sqlx::{Pool, Postgres};

/// Audit action tags.
pub mod actions {
    pub const LOGIN: &str = "LOGIN";
    pub const CREATE_USER: &str = "CREATE_USER";
    pub const UPDATE_USER: &str = "UPDATE_USER";
    pub const CREATE_CASE: &str = "CREATE_CASE";
    pub const UPDATE_CASE: &str = "UPDATE_CASE";
    pub const CLOSE_CASE: &str = "CLOSE_CASE";
    pub const CREATE_CLOSE_REQUEST: &str = "CREATE_CLOSE_REQUEST";
    pub const APPROVE_CLOSE_REQUEST: &str = "APPROVE_CLOSE_REQUEST";
    pub const REJECT_CLOSE_REQUEST: &str = "REJECT_CLOSE_REQUEST";
    pub const CREATE_RPP_CASE: &str = "CREATE_RPP_CASE";
    pub const UPDATE_RPP_CASE: &str = "UPDATE_RPP_CASE";
}

/// One audit entry to append. Repo operations return these alongside
/// their result; handlers hand them to `dispatch` after the work is done.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user_id: i64,
    pub action: &'static str,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(
        user_id: i64,
        action: &'static str,
        resource_type: &'static str,
        resource_id: impl ToString,
        details: serde_json::Value,
    ) -> Self {
        Self {
            user_id,
            action,
            resource_type,
            resource_id: resource_id.to_string(),
            details,
        }
    }
}

/// Append audit events on a detached task. Best-effort by contract:
/// insert failures are logged and never reach the caller.
pub fn dispatch(pool: &Pool<Postgres>, events: Vec<AuditEvent>) {
    if events.is_empty() {
        return;
    }
    let pool = pool.clone();
    tokio::spawn(async move {
        for event in events {
            if let Err(err) = insert(&pool, &event).await {
                log::warn!("audit write failed for {}: {err}", event.action);
            }
        }
    });
}

async fn insert(pool: &Pool<Postgres>, event: &AuditEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (user_id, action, resource_type, resource_id, details)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(event.user_id)
    .bind(event.action)
    .bind(event.resource_type)
    .bind(&event.resource_id)
    .bind(&event.details)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_captures_resource_reference() {
        let event = AuditEvent::new(
            7,
            actions::CLOSE_CASE,
            "exec_case",
            uuid::Uuid::nil(),
            serde_json::json!({ "resolution": "resolved" }),
        );
        assert_eq!(event.action, "CLOSE_CASE");
        assert_eq!(event.resource_id, uuid::Uuid::nil().to_string());
        assert_eq!(event.details["resolution"], "resolved");
    }
}
