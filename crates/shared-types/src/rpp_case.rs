use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Domain struct
// ---------------------------------------------------------------------------

/// Intake channels for an incoming report. A BMID may have at most one
/// record per channel, so at most two records in total.
pub const SOURCE_EMAIL: &str = "Email";
pub const SOURCE_RPP_PORTAL: &str = "RPP Portal";

/// Sentinel fund result meaning no recovered funds were found.
pub const FUND_RESULT_NONE: &str = "None";
/// Values forced onto the PR status / memo type when the fund result is
/// the "None" sentinel.
pub const FUND_PR_STATUS_NIL: &str = "Nil";
pub const FUND_MEMO_NO_RECORD: &str = "No record found";

/// An incoming report logged by the officer desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct RppCase {
    pub id: Uuid,
    /// Business/member identifier used for duplicate detection.
    pub bmid: String,
    pub rpp_id: Option<String>,
    pub source_type: String,
    pub date_received: NaiveDate,
    /// Derived `YYYY-MM` period of receipt.
    pub month_received: String,
    pub email: Option<String>,
    pub rpp_portal: Option<String>,
    pub complainant_name: Option<String>,
    pub complainant_ic: Option<String>,
    pub complainant_phone: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub amount: f64,
    pub fraud_type: Option<String>,
    pub icbs_tag: Option<String>,
    pub action_taken_icbs: Option<String>,
    pub fund_result: Option<String>,
    pub fund_pr_status: Option<String>,
    pub fund_memo_type: Option<String>,
    pub status: String,
    pub remarks: Option<String>,
    pub pic: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Request/response DTOs
// ---------------------------------------------------------------------------

/// Request body for logging an incoming report.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateRppCaseRequest {
    #[serde(default)]
    pub bmid: Option<String>,
    #[serde(default)]
    pub rpp_id: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub date_received: Option<NaiveDate>,
    #[serde(default)]
    pub month_received: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rpp_portal: Option<String>,
    #[serde(default)]
    pub complainant_name: Option<String>,
    #[serde(default)]
    pub complainant_ic: Option<String>,
    #[serde(default)]
    pub complainant_phone: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub fraud_type: Option<String>,
    #[serde(default)]
    pub icbs_tag: Option<String>,
    #[serde(default)]
    pub action_taken_icbs: Option<String>,
    #[serde(default)]
    pub fund_result: Option<String>,
    #[serde(default)]
    pub fund_pr_status: Option<String>,
    #[serde(default)]
    pub fund_memo_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Partial patch for an incoming report. Record id, creation timestamp,
/// and creator are immutable and have no field here.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateRppCaseRequest {
    #[serde(default)]
    pub bmid: Option<String>,
    #[serde(default)]
    pub rpp_id: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub date_received: Option<NaiveDate>,
    #[serde(default)]
    pub month_received: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rpp_portal: Option<String>,
    #[serde(default)]
    pub complainant_name: Option<String>,
    #[serde(default)]
    pub complainant_ic: Option<String>,
    #[serde(default)]
    pub complainant_phone: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub fraud_type: Option<String>,
    #[serde(default)]
    pub icbs_tag: Option<String>,
    #[serde(default)]
    pub action_taken_icbs: Option<String>,
    #[serde(default)]
    pub fund_result: Option<String>,
    #[serde(default)]
    pub fund_pr_status: Option<String>,
    #[serde(default)]
    pub fund_memo_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub pic: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RppCaseEnvelope {
    pub case: RppCase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RppCasesEnvelope {
    pub cases: Vec<RppCase>,
}
