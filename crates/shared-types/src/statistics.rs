use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A case older than this many whole days has breached its turnaround time.
pub const TAT_BREACH_DAYS: i64 = 14;

/// Ageing bucket thresholds, in whole days. Rendered client-side; the
/// server only reports the breach count.
pub const TAT_GREEN_MAX_DAYS: i64 = 6;
pub const TAT_AMBER_MAX_DAYS: i64 = 9;
pub const TAT_RED_MAX_DAYS: i64 = 14;

/// Tally of investigation cases per classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClassificationCounts {
    #[serde(rename = "Fraud")]
    pub fraud: i64,
    #[serde(rename = "Scam")]
    pub scam: i64,
    #[serde(rename = "Non-Fraud")]
    pub non_fraud: i64,
}

/// Read-only rollups over the current case state, recomputed per call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Statistics {
    pub total_exec_cases: i64,
    pub total_rpp_cases: i64,
    pub pending_close_requests: i64,
    /// Investigation cases whose age exceeds `TAT_BREACH_DAYS`.
    pub tat_breach: i64,
    pub classification: ClassificationCounts,
    pub mo_breakdown: HashMap<String, i64>,
    pub bank_breakdown: HashMap<String, i64>,
    pub rpp_monthly: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatisticsEnvelope {
    pub statistics: Statistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_counts_use_display_keys() {
        let counts = ClassificationCounts {
            fraud: 3,
            scam: 1,
            non_fraud: 2,
        };
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["Fraud"], 3);
        assert_eq!(json["Scam"], 1);
        assert_eq!(json["Non-Fraud"], 2);
    }
}
