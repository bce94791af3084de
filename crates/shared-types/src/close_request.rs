use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review states of a close request. Pending is the only non-terminal one.
pub const REQUEST_PENDING: &str = "Pending";
pub const REQUEST_APPROVED: &str = "Approved";
pub const REQUEST_REJECTED: &str = "Rejected";

/// A proposal to close an investigation case, raised by a non-PIC user
/// and reviewed by the senior desk. Case context is snapshotted at raise
/// time so later edits to the case do not alter what was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct CloseCaseRequestRecord {
    pub id: Uuid,
    pub exec_case_id: Uuid,
    pub case_id_ref: String,
    pub customer_name: String,
    pub classification: String,
    pub requested_by: i64,
    pub remarks: Option<String>,
    pub resolution: Option<String>,
    pub status: String,
    pub senior_remark: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A close request annotated with the requester's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CloseCaseRequestView {
    #[serde(flatten)]
    pub request: CloseCaseRequestRecord,
    pub requested_by_name: String,
}

/// Body for raising a close request against an existing case.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RaiseCloseRequest {
    /// Record id of the investigation case to close.
    #[serde(default)]
    pub case_id: Option<Uuid>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// Body for the senior review decision.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReviewCloseRequest {
    /// "approved" or "rejected" (case-insensitive).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub senior_remark: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CloseRequestEnvelope {
    pub request: CloseCaseRequestRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CloseRequestsEnvelope {
    pub requests: Vec<CloseCaseRequestRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CloseRequestViewsEnvelope {
    pub requests: Vec<CloseCaseRequestView>,
}
