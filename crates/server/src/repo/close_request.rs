use shared_types::{
    AppError, CloseCaseRequestRecord, CloseCaseRequestView, RaiseCloseRequest, ReviewCloseRequest,
    REQUEST_APPROVED, REQUEST_PENDING, REQUEST_REJECTED, STATUS_CLOSED,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::audit::{actions, AuditEvent};
use crate::auth::extractors::Actor;
use crate::error_convert::SqlxErrorExt;
use crate::repo::user;

const REQUEST_COLUMNS: &str = "id, exec_case_id, case_id_ref, customer_name, classification, \
     requested_by, remarks, resolution, status, senior_remark, reviewed_by, reviewed_at, created_at";

/// Normalize the reviewer's decision. Accepts "approved"/"rejected"
/// case-insensitively; anything else is invalid.
fn parse_review_status(raw: &str) -> Option<&'static str> {
    match raw.to_lowercase().as_str() {
        "approved" => Some(REQUEST_APPROVED),
        "rejected" => Some(REQUEST_REJECTED),
        _ => None,
    }
}

/// Raise a close request against an existing case. The case's code,
/// customer, and classification are snapshotted so later edits to the
/// case do not alter the pending request's context.
pub async fn raise(
    pool: &Pool<Postgres>,
    actor: &Actor,
    req: RaiseCloseRequest,
) -> Result<(CloseCaseRequestRecord, Vec<AuditEvent>), AppError> {
    let case_id = req
        .case_id
        .ok_or_else(|| AppError::validation("Case reference is required"))?;

    let case: Option<(Uuid, String, String, String)> = sqlx::query_as(
        "SELECT id, case_id, customer_name, classification FROM exec_cases WHERE id = $1",
    )
    .bind(case_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let (exec_case_id, case_code, customer_name, classification) =
        case.ok_or_else(|| AppError::not_found("Case not found"))?;

    let record = sqlx::query_as::<_, CloseCaseRequestRecord>(&format!(
        r#"
        INSERT INTO close_case_requests
            (exec_case_id, case_id_ref, customer_name, classification,
             requested_by, remarks, resolution, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(exec_case_id)
    .bind(&case_code)
    .bind(&customer_name)
    .bind(&classification)
    .bind(actor.id)
    .bind(&req.remarks)
    .bind(&req.resolution)
    .bind(REQUEST_PENDING)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::CREATE_CLOSE_REQUEST,
        "close_request",
        record.id,
        serde_json::json!({ "case_id": case_code }),
    )];

    Ok((record, events))
}

/// The actor's own requests, newest first, optionally filtered by status.
pub async fn list_by_requester(
    pool: &Pool<Postgres>,
    requester: i64,
    status: Option<&str>,
) -> Result<Vec<CloseCaseRequestRecord>, AppError> {
    let rows = sqlx::query_as::<_, CloseCaseRequestRecord>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM close_case_requests
        WHERE requested_by = $1
          AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#
    ))
    .bind(requester)
    .bind(status)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// All requests for the senior review queue, annotated with the
/// requester's display name.
pub async fn list_for_review(
    pool: &Pool<Postgres>,
) -> Result<Vec<CloseCaseRequestView>, AppError> {
    let rows = sqlx::query_as::<_, CloseCaseRequestRecord>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM close_case_requests ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let mut requester_ids: Vec<i64> = rows.iter().map(|r| r.requested_by).collect();
    requester_ids.sort_unstable();
    requester_ids.dedup();
    let names = user::summaries_by_ids(pool, &requester_ids).await?;

    Ok(rows
        .into_iter()
        .map(|request| {
            let requested_by_name = names
                .get(&request.requested_by)
                .map(user::display_name)
                .unwrap_or_else(|| "Unknown".to_string());
            CloseCaseRequestView {
                request,
                requested_by_name,
            }
        })
        .collect())
}

/// Review (approve or reject) a pending close request.
///
/// Approval closes the referenced case with the remarks/resolution stored
/// on the request at raise time; the reviewer cannot substitute their own.
/// Both writes happen in one transaction. A request that is no longer
/// Pending is a conflict.
pub async fn review(
    pool: &Pool<Postgres>,
    actor: &Actor,
    id: Uuid,
    req: ReviewCloseRequest,
) -> Result<(CloseCaseRequestRecord, Vec<AuditEvent>), AppError> {
    let decision = req
        .status
        .as_deref()
        .and_then(parse_review_status)
        .ok_or_else(|| {
            AppError::validation("Invalid status. Use \"approved\" or \"rejected\"")
        })?;

    let senior_remark = req
        .senior_remark
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::validation("Senior remark is mandatory for approval/rejection")
        })?
        .to_string();

    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let pending = sqlx::query_as::<_, CloseCaseRequestRecord>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM close_case_requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::not_found("Close request not found"))?;

    if pending.status != REQUEST_PENDING {
        return Err(AppError::conflict("Close request already reviewed"));
    }

    let updated = sqlx::query_as::<_, CloseCaseRequestRecord>(&format!(
        r#"
        UPDATE close_case_requests SET
            status        = $2,
            senior_remark = $3,
            reviewed_by   = $4,
            reviewed_at   = NOW()
        WHERE id = $1
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(decision)
    .bind(&senior_remark)
    .bind(actor.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let mut events = Vec::new();

    if decision == REQUEST_APPROVED {
        let closed = sqlx::query(
            r#"
            UPDATE exec_cases SET
                status          = $2,
                closing_remarks = $3,
                resolution      = $4,
                date_closed     = NOW(),
                closed_by       = $5,
                updated_at      = NOW()
            WHERE id = $1
            "#,
        )
        .bind(pending.exec_case_id)
        .bind(STATUS_CLOSED)
        .bind(&pending.remarks)
        .bind(&pending.resolution)
        .bind(actor.id)
        .execute(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        if closed.rows_affected() == 0 {
            // Dropping the transaction rolls the review back too.
            return Err(AppError::not_found("Case not found"));
        }

        events.push(AuditEvent::new(
            actor.id,
            actions::APPROVE_CLOSE_REQUEST,
            "close_request",
            id,
            serde_json::json!({ "senior_remark": senior_remark }),
        ));
        events.push(AuditEvent::new(
            actor.id,
            actions::CLOSE_CASE,
            "exec_case",
            pending.exec_case_id,
            serde_json::json!({ "via": "senior_approval" }),
        ));
    } else {
        events.push(AuditEvent::new(
            actor.id,
            actions::REJECT_CLOSE_REQUEST,
            "close_request",
            id,
            serde_json::json!({ "senior_remark": senior_remark }),
        ));
    }

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok((updated, events))
}

/// Count of requests still awaiting review.
pub async fn count_pending(pool: &Pool<Postgres>) -> Result<i64, AppError> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM close_case_requests WHERE status = $1")
            .bind(REQUEST_PENDING)
            .fetch_one(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

    Ok(count.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_status_accepts_both_decisions_case_insensitively() {
        assert_eq!(parse_review_status("approved"), Some("Approved"));
        assert_eq!(parse_review_status("APPROVED"), Some("Approved"));
        assert_eq!(parse_review_status("Rejected"), Some("Rejected"));
        assert_eq!(parse_review_status("rejected"), Some("Rejected"));
    }

    #[test]
    fn review_status_rejects_anything_else() {
        assert_eq!(parse_review_status("pending"), None);
        assert_eq!(parse_review_status("approve"), None);
        assert_eq!(parse_review_status(""), None);
        assert_eq!(parse_review_status("Approved "), None);
    }
}
