use shared_types::{
    AppError, CloseCaseRequest, CreateCaseRequest, ExecCase, ExecCaseView, UpdateCaseRequest,
    CLASSIFICATIONS, STATUS_CLOSED,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::audit::{actions, AuditEvent};
use crate::auth::extractors::Actor;
use crate::error_convert::SqlxErrorExt;
use crate::repo::user;

const CASE_COLUMNS: &str = "id, case_id, ic_number, customer_name, classification, case_type, \
     mo, branch_code, branch_name, date_escalated, amount_involved, remarks, pic, status, \
     closing_remarks, resolution, date_closed, closed_by, created_by, created_at, updated_at";

/// Presence check for the mandatory create fields. Whitespace-only
/// strings count as missing.
fn validate_create(req: &CreateCaseRequest) -> Result<(), AppError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

    if !present(&req.case_id)
        || !present(&req.ic_number)
        || !present(&req.customer_name)
        || !present(&req.classification)
        || !present(&req.case_type)
        || !present(&req.mo)
        || !present(&req.branch_code)
        || req.date_escalated.is_none()
        || req.pic.is_none()
    {
        return Err(AppError::validation("Missing required fields"));
    }

    validate_classification(req.classification.as_deref().unwrap_or_default())
}

fn validate_classification(classification: &str) -> Result<(), AppError> {
    if CLASSIFICATIONS.contains(&classification) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Classification must be Fraud, Scam, or Non-Fraud",
        ))
    }
}

/// Create an investigation case. Status is forced to WIP regardless of
/// caller input; the creator is bound to the acting user.
pub async fn create(
    pool: &Pool<Postgres>,
    actor: &Actor,
    req: CreateCaseRequest,
) -> Result<(ExecCase, Vec<AuditEvent>), AppError> {
    validate_create(&req)?;

    let case_id = req.case_id.as_deref().unwrap_or_default().trim().to_string();

    // Friendly pre-check; the unique constraint is the real guard against
    // a concurrent create racing past this.
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM exec_cases WHERE case_id = $1")
            .bind(&case_id)
            .fetch_optional(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;
    if existing.is_some() {
        return Err(AppError::conflict("Case ID already exists"));
    }

    let case = sqlx::query_as::<_, ExecCase>(&format!(
        r#"
        INSERT INTO exec_cases
            (case_id, ic_number, customer_name, classification, case_type, mo,
             branch_code, branch_name, date_escalated, amount_involved, remarks,
             pic, status, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'WIP', $13)
        RETURNING {CASE_COLUMNS}
        "#
    ))
    .bind(&case_id)
    .bind(req.ic_number.as_deref().map(str::trim))
    .bind(req.customer_name.as_deref().map(str::trim))
    .bind(&req.classification)
    .bind(&req.case_type)
    .bind(&req.mo)
    .bind(&req.branch_code)
    .bind(&req.branch_name)
    .bind(req.date_escalated)
    .bind(req.amount_involved.unwrap_or(0.0))
    .bind(&req.remarks)
    .bind(req.pic)
    .bind(actor.id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::CREATE_CASE,
        "exec_case",
        case.id,
        serde_json::json!({ "case_id": case.case_id.clone() }),
    )];

    Ok((case, events))
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<ExecCase>, AppError> {
    let row = sqlx::query_as::<_, ExecCase>(&format!(
        "SELECT {CASE_COLUMNS} FROM exec_cases WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List cases, newest first. `scope_pic` restricts to cases owned by that
/// user (the default view); `search` is a case-insensitive substring match
/// on the case code.
pub async fn list(
    pool: &Pool<Postgres>,
    scope_pic: Option<i64>,
    search: Option<&str>,
) -> Result<Vec<ExecCase>, AppError> {
    let pattern = search.map(|s| format!("%{}%", s));

    let rows = sqlx::query_as::<_, ExecCase>(&format!(
        r#"
        SELECT {CASE_COLUMNS}
        FROM exec_cases
        WHERE ($1::BIGINT IS NULL OR pic = $1)
          AND ($2::TEXT IS NULL OR case_id ILIKE $2)
        ORDER BY created_at DESC
        "#
    ))
    .bind(scope_pic)
    .bind(pattern)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Annotate cases with the resolved PIC display name. An unresolvable
/// owner reference maps to "Unknown".
pub async fn resolve_views(
    pool: &Pool<Postgres>,
    cases: Vec<ExecCase>,
) -> Result<Vec<ExecCaseView>, AppError> {
    let mut pic_ids: Vec<i64> = cases.iter().map(|c| c.pic).collect();
    pic_ids.sort_unstable();
    pic_ids.dedup();

    let names = user::summaries_by_ids(pool, &pic_ids).await?;

    Ok(cases
        .into_iter()
        .map(|case| {
            let pic_name = names
                .get(&case.pic)
                .map(user::display_name)
                .unwrap_or_else(|| "Unknown".to_string());
            ExecCaseView { case, pic_name }
        })
        .collect())
}

/// Annotate a single case with its resolved PIC display name.
pub async fn resolve_view(
    pool: &Pool<Postgres>,
    case: ExecCase,
) -> Result<ExecCaseView, AppError> {
    resolve_views(pool, vec![case])
        .await?
        .pop()
        .ok_or_else(|| AppError::internal("Failed to resolve case view"))
}

/// Apply a partial patch. Identifier, creation timestamp, and creator are
/// immutable; `updated_at` is always bumped.
pub async fn update(
    pool: &Pool<Postgres>,
    actor: &Actor,
    id: Uuid,
    req: UpdateCaseRequest,
) -> Result<(ExecCase, Vec<AuditEvent>), AppError> {
    if let Some(classification) = req.classification.as_deref() {
        validate_classification(classification)?;
    }

    let case = sqlx::query_as::<_, ExecCase>(&format!(
        r#"
        UPDATE exec_cases SET
            case_id         = COALESCE($2, case_id),
            ic_number       = COALESCE($3, ic_number),
            customer_name   = COALESCE($4, customer_name),
            classification  = COALESCE($5, classification),
            case_type       = COALESCE($6, case_type),
            mo              = COALESCE($7, mo),
            branch_code     = COALESCE($8, branch_code),
            branch_name     = COALESCE($9, branch_name),
            date_escalated  = COALESCE($10, date_escalated),
            amount_involved = COALESCE($11, amount_involved),
            remarks         = COALESCE($12, remarks),
            pic             = COALESCE($13, pic),
            status          = COALESCE($14, status),
            updated_at      = NOW()
        WHERE id = $1
        RETURNING {CASE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&req.case_id)
    .bind(&req.ic_number)
    .bind(&req.customer_name)
    .bind(&req.classification)
    .bind(&req.case_type)
    .bind(&req.mo)
    .bind(&req.branch_code)
    .bind(&req.branch_name)
    .bind(req.date_escalated)
    .bind(req.amount_involved)
    .bind(&req.remarks)
    .bind(req.pic)
    .bind(&req.status)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::not_found("Case not found"))?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::UPDATE_CASE,
        "exec_case",
        id,
        serde_json::json!({ "case_id": case.case_id.clone() }),
    )];

    Ok((case, events))
}

/// Direct close by the current PIC. The ownership check applies to every
/// role, superadmin included.
pub async fn close_directly(
    pool: &Pool<Postgres>,
    actor: &Actor,
    id: Uuid,
    req: CloseCaseRequest,
) -> Result<(ExecCase, Vec<AuditEvent>), AppError> {
    let pic: Option<(i64,)> = sqlx::query_as("SELECT pic FROM exec_cases WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    let (pic,) = pic.ok_or_else(|| AppError::not_found("Case not found"))?;
    if pic != actor.id {
        return Err(AppError::forbidden(
            "Only the PIC can directly close this case",
        ));
    }

    let case = sqlx::query_as::<_, ExecCase>(&format!(
        r#"
        UPDATE exec_cases SET
            status          = $2,
            closing_remarks = $3,
            resolution      = $4,
            date_closed     = NOW(),
            closed_by       = $5,
            updated_at      = NOW()
        WHERE id = $1
        RETURNING {CASE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(STATUS_CLOSED)
    .bind(&req.remarks)
    .bind(&req.resolution)
    .bind(actor.id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::CLOSE_CASE,
        "exec_case",
        id,
        serde_json::json!({ "resolution": req.resolution }),
    )];

    Ok((case, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn full_request() -> CreateCaseRequest {
        CreateCaseRequest {
            case_id: Some("C-1001".into()),
            ic_number: Some("900101-14-5678".into()),
            customer_name: Some("Tan Mei Ling".into()),
            classification: Some("Fraud".into()),
            case_type: Some("ATO".into()),
            mo: Some("Phishing".into()),
            branch_code: Some("B012".into()),
            branch_name: None,
            date_escalated: NaiveDate::from_ymd_opt(2024, 1, 1),
            amount_involved: None,
            remarks: None,
            pic: Some(7),
        }
    }

    #[test]
    fn complete_request_passes_validation() {
        assert!(validate_create(&full_request()).is_ok());
    }

    #[test]
    fn each_mandatory_field_is_required() {
        let mut req = full_request();
        req.case_id = None;
        assert!(validate_create(&req).is_err());

        let mut req = full_request();
        req.pic = None;
        assert!(validate_create(&req).is_err());

        let mut req = full_request();
        req.date_escalated = None;
        assert!(validate_create(&req).is_err());

        let mut req = full_request();
        req.mo = Some("   ".into());
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn classification_is_whitelisted() {
        let mut req = full_request();
        req.classification = Some("Suspicious".into());
        assert!(validate_create(&req).is_err());

        for ok in CLASSIFICATIONS {
            let mut req = full_request();
            req.classification = Some(ok.into());
            assert!(validate_create(&req).is_ok());
        }
    }
}
