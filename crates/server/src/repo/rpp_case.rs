use chrono::NaiveDate;
use shared_types::{
    AppError, CreateRppCaseRequest, RppCase, UpdateRppCaseRequest, FUND_MEMO_NO_RECORD,
    FUND_PR_STATUS_NIL, FUND_RESULT_NONE, SOURCE_EMAIL, SOURCE_RPP_PORTAL,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::audit::{actions, AuditEvent};
use crate::auth::extractors::Actor;
use crate::error_convert::SqlxErrorExt;

const RPP_COLUMNS: &str = "id, bmid, rpp_id, source_type, date_received, month_received, email, \
     rpp_portal, complainant_name, complainant_ic, complainant_phone, bank_name, account_number, \
     amount, fraud_type, icbs_tag, action_taken_icbs, fund_result, fund_pr_status, \
     fund_memo_type, status, remarks, pic, created_by, created_at, updated_at";

fn validate_source_type(source_type: &str) -> Result<(), AppError> {
    if source_type == SOURCE_EMAIL || source_type == SOURCE_RPP_PORTAL {
        Ok(())
    } else {
        Err(AppError::validation(
            "Source Type must be \"Email\" or \"RPP Portal\"",
        ))
    }
}

/// Duplicate-entry rule: at most two records per BMID, and they must use
/// different source types.
fn check_duplicate_rule(
    existing: &[(Uuid, String)],
    source_type: &str,
) -> Result<(), AppError> {
    if existing.len() >= 2 {
        return Err(AppError::conflict(
            "Maximum 2 entries per BMID reached (one Email + one RPP Portal)",
        ));
    }
    if existing.iter().any(|(_, s)| s == source_type) {
        return Err(AppError::conflict(format!(
            "This BMID already has a \"{source_type}\" entry. Use a different source type."
        )));
    }
    Ok(())
}

/// Fund-field rule. The "None" sentinel forces the fixed PR status and
/// memo type; any other fund result makes both mandatory.
fn apply_fund_rule(
    fund_result: Option<&str>,
    fund_pr_status: Option<String>,
    fund_memo_type: Option<String>,
) -> Result<(Option<String>, Option<String>), AppError> {
    match fund_result {
        Some(FUND_RESULT_NONE) => Ok((
            Some(FUND_PR_STATUS_NIL.to_string()),
            Some(FUND_MEMO_NO_RECORD.to_string()),
        )),
        Some(_) => {
            let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
            if !present(&fund_pr_status) || !present(&fund_memo_type) {
                return Err(AppError::validation(
                    "Fund PR Status and Memo Type are required when Fund Result is not \"None\"",
                ));
            }
            Ok((fund_pr_status, fund_memo_type))
        }
        None => Ok((fund_pr_status, fund_memo_type)),
    }
}

/// Keep only the channel field matching the source type.
fn channel_fields(
    source_type: &str,
    email: Option<String>,
    rpp_portal: Option<String>,
) -> (Option<String>, Option<String>) {
    if source_type == SOURCE_EMAIL {
        (email, None)
    } else {
        (None, rpp_portal)
    }
}

/// Receipt month in `YYYY-MM` form: an explicit value wins, otherwise it
/// is derived from the receipt date.
fn derive_month(explicit: Option<&str>, date_received: NaiveDate) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(m) => m.to_string(),
        None => date_received.format("%Y-%m").to_string(),
    }
}

async fn entries_for_bmid(
    pool: &Pool<Postgres>,
    bmid: &str,
    exclude: Option<Uuid>,
) -> Result<Vec<(Uuid, String)>, AppError> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT id, source_type
        FROM rpp_cases
        WHERE bmid = $1 AND ($2::UUID IS NULL OR id <> $2)
        "#,
    )
    .bind(bmid)
    .bind(exclude)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Log an incoming report. PIC and creator are both bound to the acting
/// user; there is no delegation on create.
pub async fn create(
    pool: &Pool<Postgres>,
    actor: &Actor,
    req: CreateRppCaseRequest,
) -> Result<(RppCase, Vec<AuditEvent>), AppError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !present(&req.bmid) || !present(&req.source_type) {
        return Err(AppError::validation("BMID and Source Type are required"));
    }

    let bmid = req.bmid.as_deref().unwrap_or_default().trim().to_string();
    let source_type = req.source_type.as_deref().unwrap_or_default().trim().to_string();
    validate_source_type(&source_type)?;

    // Friendly pre-check; the (bmid, source_type) unique constraint is the
    // real guard against a concurrent create racing past this.
    let existing = entries_for_bmid(pool, &bmid, None).await?;
    check_duplicate_rule(&existing, &source_type)?;

    let (fund_pr_status, fund_memo_type) = apply_fund_rule(
        req.fund_result.as_deref(),
        req.fund_pr_status,
        req.fund_memo_type,
    )?;

    let (email, rpp_portal) = channel_fields(&source_type, req.email, req.rpp_portal);

    let date_received = req
        .date_received
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let month_received = derive_month(req.month_received.as_deref(), date_received);

    let case = sqlx::query_as::<_, RppCase>(&format!(
        r#"
        INSERT INTO rpp_cases
            (bmid, rpp_id, source_type, date_received, month_received, email, rpp_portal,
             complainant_name, complainant_ic, complainant_phone, bank_name, account_number,
             amount, fraud_type, icbs_tag, action_taken_icbs, fund_result, fund_pr_status,
             fund_memo_type, status, remarks, pic, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, COALESCE($20, 'Pending'), $21, $22, $22)
        RETURNING {RPP_COLUMNS}
        "#
    ))
    .bind(&bmid)
    .bind(&req.rpp_id)
    .bind(&source_type)
    .bind(date_received)
    .bind(&month_received)
    .bind(&email)
    .bind(&rpp_portal)
    .bind(&req.complainant_name)
    .bind(&req.complainant_ic)
    .bind(&req.complainant_phone)
    .bind(&req.bank_name)
    .bind(&req.account_number)
    .bind(req.amount.unwrap_or(0.0))
    .bind(&req.fraud_type)
    .bind(&req.icbs_tag)
    .bind(&req.action_taken_icbs)
    .bind(&req.fund_result)
    .bind(&fund_pr_status)
    .bind(&fund_memo_type)
    .bind(&req.status)
    .bind(&req.remarks)
    .bind(actor.id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::CREATE_RPP_CASE,
        "rpp_case",
        case.id,
        serde_json::json!({ "bmid": bmid, "source_type": source_type }),
    )];

    Ok((case, events))
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<RppCase>, AppError> {
    let row = sqlx::query_as::<_, RppCase>(&format!(
        "SELECT {RPP_COLUMNS} FROM rpp_cases WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// All incoming reports, newest first.
pub async fn list(pool: &Pool<Postgres>) -> Result<Vec<RppCase>, AppError> {
    let rows = sqlx::query_as::<_, RppCase>(&format!(
        "SELECT {RPP_COLUMNS} FROM rpp_cases ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Apply a partial patch, re-running the duplicate and fund rules on the
/// incoming fields. Identifier, creation timestamp, and creator are
/// immutable.
pub async fn update(
    pool: &Pool<Postgres>,
    actor: &Actor,
    id: Uuid,
    req: UpdateRppCaseRequest,
) -> Result<(RppCase, Vec<AuditEvent>), AppError> {
    let existing_case = find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("RPP case not found"))?;

    if let Some(source_type) = req.source_type.as_deref() {
        validate_source_type(source_type)?;
    }

    // Re-check duplicates (excluding this record) whenever the BMID or
    // source type is part of the patch.
    if req.bmid.is_some() || req.source_type.is_some() {
        let bmid = req.bmid.as_deref().unwrap_or(&existing_case.bmid);
        let source_type = req
            .source_type
            .as_deref()
            .unwrap_or(&existing_case.source_type);

        let others = entries_for_bmid(pool, bmid, Some(id)).await?;
        check_duplicate_rule(&others, source_type)?;
    }

    let (fund_pr_status, fund_memo_type) = apply_fund_rule(
        req.fund_result.as_deref(),
        req.fund_pr_status,
        req.fund_memo_type,
    )?;

    let case = sqlx::query_as::<_, RppCase>(&format!(
        r#"
        UPDATE rpp_cases SET
            bmid              = COALESCE($2, bmid),
            rpp_id            = COALESCE($3, rpp_id),
            source_type       = COALESCE($4, source_type),
            date_received     = COALESCE($5, date_received),
            month_received    = COALESCE($6, month_received),
            email             = COALESCE($7, email),
            rpp_portal        = COALESCE($8, rpp_portal),
            complainant_name  = COALESCE($9, complainant_name),
            complainant_ic    = COALESCE($10, complainant_ic),
            complainant_phone = COALESCE($11, complainant_phone),
            bank_name         = COALESCE($12, bank_name),
            account_number    = COALESCE($13, account_number),
            amount            = COALESCE($14, amount),
            fraud_type        = COALESCE($15, fraud_type),
            icbs_tag          = COALESCE($16, icbs_tag),
            action_taken_icbs = COALESCE($17, action_taken_icbs),
            fund_result       = COALESCE($18, fund_result),
            fund_pr_status    = COALESCE($19, fund_pr_status),
            fund_memo_type    = COALESCE($20, fund_memo_type),
            status            = COALESCE($21, status),
            remarks           = COALESCE($22, remarks),
            pic               = COALESCE($23, pic),
            updated_at        = NOW()
        WHERE id = $1
        RETURNING {RPP_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&req.bmid)
    .bind(&req.rpp_id)
    .bind(&req.source_type)
    .bind(req.date_received)
    .bind(&req.month_received)
    .bind(&req.email)
    .bind(&req.rpp_portal)
    .bind(&req.complainant_name)
    .bind(&req.complainant_ic)
    .bind(&req.complainant_phone)
    .bind(&req.bank_name)
    .bind(&req.account_number)
    .bind(req.amount)
    .bind(&req.fraud_type)
    .bind(&req.icbs_tag)
    .bind(&req.action_taken_icbs)
    .bind(&req.fund_result)
    .bind(&fund_pr_status)
    .bind(&fund_memo_type)
    .bind(&req.status)
    .bind(&req.remarks)
    .bind(req.pic)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .ok_or_else(|| AppError::not_found("RPP case not found"))?;

    let events = vec![AuditEvent::new(
        actor.id,
        actions::UPDATE_RPP_CASE,
        "rpp_case",
        id,
        serde_json::json!({ "bmid": case.bmid.clone() }),
    )];

    Ok((case, events))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source_type: &str) -> (Uuid, String) {
        (Uuid::new_v4(), source_type.to_string())
    }

    #[test]
    fn first_entry_for_a_bmid_is_allowed() {
        assert!(check_duplicate_rule(&[], SOURCE_EMAIL).is_ok());
        assert!(check_duplicate_rule(&[], SOURCE_RPP_PORTAL).is_ok());
    }

    #[test]
    fn second_entry_needs_a_different_source_type() {
        let existing = [entry(SOURCE_EMAIL)];
        assert!(check_duplicate_rule(&existing, SOURCE_RPP_PORTAL).is_ok());

        let err = check_duplicate_rule(&existing, SOURCE_EMAIL).unwrap_err();
        assert_eq!(err.kind, shared_types::AppErrorKind::Conflict);
    }

    #[test]
    fn third_entry_is_always_rejected() {
        let existing = [entry(SOURCE_EMAIL), entry(SOURCE_RPP_PORTAL)];
        let err = check_duplicate_rule(&existing, SOURCE_EMAIL).unwrap_err();
        assert_eq!(err.kind, shared_types::AppErrorKind::Conflict);
    }

    #[test]
    fn fund_none_forces_sentinel_values() {
        let (pr, memo) = apply_fund_rule(
            Some(FUND_RESULT_NONE),
            Some("Recovered".into()),
            Some("Memo A".into()),
        )
        .unwrap();
        assert_eq!(pr.as_deref(), Some(FUND_PR_STATUS_NIL));
        assert_eq!(memo.as_deref(), Some(FUND_MEMO_NO_RECORD));
    }

    #[test]
    fn fund_result_set_requires_both_fields() {
        let err = apply_fund_rule(Some("Recovered"), None, Some("Memo".into())).unwrap_err();
        assert_eq!(err.kind, shared_types::AppErrorKind::Validation);

        let err = apply_fund_rule(Some("Recovered"), Some("PR-1".into()), Some("  ".into()))
            .unwrap_err();
        assert_eq!(err.kind, shared_types::AppErrorKind::Validation);

        let (pr, memo) =
            apply_fund_rule(Some("Recovered"), Some("PR-1".into()), Some("Memo".into())).unwrap();
        assert_eq!(pr.as_deref(), Some("PR-1"));
        assert_eq!(memo.as_deref(), Some("Memo"));
    }

    #[test]
    fn absent_fund_result_passes_fields_through() {
        let (pr, memo) = apply_fund_rule(None, None, Some("Memo".into())).unwrap();
        assert!(pr.is_none());
        assert_eq!(memo.as_deref(), Some("Memo"));
    }

    #[test]
    fn channel_fields_null_the_inapplicable_side() {
        let (email, portal) = channel_fields(
            SOURCE_EMAIL,
            Some("a@b.com".into()),
            Some("REF-1".into()),
        );
        assert_eq!(email.as_deref(), Some("a@b.com"));
        assert!(portal.is_none());

        let (email, portal) = channel_fields(
            SOURCE_RPP_PORTAL,
            Some("a@b.com".into()),
            Some("REF-1".into()),
        );
        assert!(email.is_none());
        assert_eq!(portal.as_deref(), Some("REF-1"));
    }

    #[test]
    fn month_derivation_takes_first_seven_of_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(derive_month(None, date), "2024-03");
    }

    #[test]
    fn explicit_month_wins_over_derivation() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(derive_month(Some("2024-01"), date), "2024-01");
        assert_eq!(derive_month(Some("  "), date), "2024-03");
    }

    #[test]
    fn source_type_is_whitelisted() {
        assert!(validate_source_type(SOURCE_EMAIL).is_ok());
        assert!(validate_source_type(SOURCE_RPP_PORTAL).is_ok());
        assert!(validate_source_type("Phone").is_err());
        assert!(validate_source_type("email").is_err());
    }
}
