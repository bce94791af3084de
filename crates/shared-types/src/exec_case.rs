use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Domain struct
// ---------------------------------------------------------------------------

/// Classification values accepted for an investigation case.
pub const CLASSIFICATIONS: [&str; 3] = ["Fraud", "Scam", "Non-Fraud"];

/// Lifecycle status of an investigation case.
pub const STATUS_WIP: &str = "WIP";
pub const STATUS_CLOSED: &str = "Closed";

/// An investigation case handled by the exec desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct ExecCase {
    pub id: Uuid,
    /// Business-facing case code, globally unique.
    pub case_id: String,
    pub ic_number: String,
    pub customer_name: String,
    pub classification: String,
    pub case_type: String,
    /// Method of operation within the classification's allowed list.
    pub mo: String,
    pub branch_code: String,
    pub branch_name: Option<String>,
    pub date_escalated: NaiveDate,
    pub amount_involved: f64,
    pub remarks: Option<String>,
    /// Person in charge; the only user allowed to close directly.
    pub pic: i64,
    pub status: String,
    pub closing_remarks: Option<String>,
    pub resolution: Option<String>,
    pub date_closed: Option<DateTime<Utc>>,
    pub closed_by: Option<i64>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A case annotated with the resolved PIC display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExecCaseView {
    #[serde(flatten)]
    pub case: ExecCase,
    pub pic_name: String,
}

// ---------------------------------------------------------------------------
// Request/response DTOs
// ---------------------------------------------------------------------------

/// Request body for creating an investigation case. Presence of the
/// mandatory fields is checked server-side so a missing field surfaces
/// as a 400 rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCaseRequest {
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub ic_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub mo: Option<String>,
    #[serde(default)]
    pub branch_code: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub date_escalated: Option<NaiveDate>,
    #[serde(default)]
    pub amount_involved: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub pic: Option<i64>,
}

/// Partial patch for an investigation case. Record id, creation
/// timestamp, and creator are immutable and have no field here.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateCaseRequest {
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub ic_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub mo: Option<String>,
    #[serde(default)]
    pub branch_code: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub date_escalated: Option<NaiveDate>,
    #[serde(default)]
    pub amount_involved: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub pic: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for the PIC-only direct close.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CloseCaseRequest {
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseEnvelope {
    pub case: ExecCaseView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CasesEnvelope {
    pub cases: Vec<ExecCaseView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_view_flattens_pic_name() {
        let case = ExecCase {
            id: Uuid::nil(),
            case_id: "C-1001".into(),
            ic_number: "900101-14-5678".into(),
            customer_name: "Tan Mei Ling".into(),
            classification: "Fraud".into(),
            case_type: "ATO".into(),
            mo: "Phishing".into(),
            branch_code: "B012".into(),
            branch_name: None,
            date_escalated: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount_involved: 1500.0,
            remarks: None,
            pic: 7,
            status: STATUS_WIP.into(),
            closing_remarks: None,
            resolution: None,
            date_closed: None,
            closed_by: None,
            created_by: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = ExecCaseView {
            case,
            pic_name: "Amira".into(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["case_id"], "C-1001");
        assert_eq!(json["pic_name"], "Amira");
        // Flattened: no nested "case" object
        assert!(json.get("case").is_none());
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateCaseRequest = serde_json::from_str(r#"{"case_id":"C-1"}"#).unwrap();
        assert_eq!(req.case_id.as_deref(), Some("C-1"));
        assert!(req.pic.is_none());
        assert!(req.date_escalated.is_none());
    }
}
