use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{AppError, Statistics, STATUS_CLOSED, TAT_BREACH_DAYS};
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;
use crate::repo::close_request;

/// The slice of an investigation case the rollups need.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExecSnapshot {
    pub classification: String,
    pub mo: String,
    pub status: String,
    pub date_escalated: NaiveDate,
    pub date_closed: Option<DateTime<Utc>>,
}

/// The slice of an incoming report the rollups need.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RppSnapshot {
    pub bank_name: Option<String>,
    pub date_received: NaiveDate,
    pub month_received: String,
}

/// Age of a case in whole days at `now`. Closed cases age up to their
/// close date, open ones up to now.
fn age_days(snapshot: &ExecSnapshot, now: DateTime<Utc>) -> i64 {
    let start = snapshot
        .date_escalated
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    let end = match (snapshot.status.as_str(), snapshot.date_closed) {
        (STATUS_CLOSED, Some(closed)) => closed,
        _ => now,
    };
    (end - start).num_days()
}

/// Pure fold over table snapshots. Recomputed on every call; nothing is
/// cached or incrementally maintained.
pub fn compute(
    exec_cases: &[ExecSnapshot],
    rpp_cases: &[RppSnapshot],
    pending_close_requests: i64,
    now: DateTime<Utc>,
) -> Statistics {
    let mut stats = Statistics {
        total_exec_cases: exec_cases.len() as i64,
        total_rpp_cases: rpp_cases.len() as i64,
        pending_close_requests,
        ..Statistics::default()
    };

    for case in exec_cases {
        if age_days(case, now) > TAT_BREACH_DAYS {
            stats.tat_breach += 1;
        }

        match case.classification.as_str() {
            "Fraud" => stats.classification.fraud += 1,
            "Scam" => stats.classification.scam += 1,
            "Non-Fraud" => stats.classification.non_fraud += 1,
            _ => {}
        }

        if !case.mo.is_empty() {
            *stats.mo_breakdown.entry(case.mo.clone()).or_insert(0) += 1;
        }
    }

    for case in rpp_cases {
        if let Some(bank) = case.bank_name.as_deref().filter(|b| !b.is_empty()) {
            *stats.bank_breakdown.entry(bank.to_string()).or_insert(0) += 1;
        }

        let month = if case.month_received.is_empty() {
            case.date_received.format("%Y-%m").to_string()
        } else {
            case.month_received.clone()
        };
        *stats.rpp_monthly.entry(month).or_insert(0) += 1;
    }

    stats
}

/// Fetch fresh snapshots and fold them.
pub async fn gather(pool: &Pool<Postgres>) -> Result<Statistics, AppError> {
    let exec_cases = sqlx::query_as::<_, ExecSnapshot>(
        "SELECT classification, mo, status, date_escalated, date_closed FROM exec_cases",
    )
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rpp_cases = sqlx::query_as::<_, RppSnapshot>(
        "SELECT bank_name, date_received, month_received FROM rpp_cases",
    )
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let pending = close_request::count_pending(pool).await?;

    Ok(compute(&exec_cases, &rpp_cases, pending, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{ClassificationCounts, STATUS_WIP};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at_noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        day(y, m, d).and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    fn open_case(classification: &str, mo: &str, escalated: NaiveDate) -> ExecSnapshot {
        ExecSnapshot {
            classification: classification.into(),
            mo: mo.into(),
            status: STATUS_WIP.into(),
            date_escalated: escalated,
            date_closed: None,
        }
    }

    #[test]
    fn fourteen_whole_days_is_not_a_breach() {
        // Escalated Jan 1, checked Jan 15 at noon: 14 days and change,
        // floored to 14, which is within the limit.
        let cases = [open_case("Fraud", "Phishing", day(2024, 1, 1))];
        let stats = compute(&cases, &[], 0, at_noon(2024, 1, 15));
        assert_eq!(stats.tat_breach, 0);
    }

    #[test]
    fn fifteen_days_is_a_breach() {
        let cases = [open_case("Fraud", "Phishing", day(2024, 1, 1))];
        let stats = compute(&cases, &[], 0, at_noon(2024, 1, 16));
        assert_eq!(stats.tat_breach, 1);
    }

    #[test]
    fn closed_case_ages_to_its_close_date() {
        let mut case = open_case("Scam", "Mule", day(2024, 1, 1));
        case.status = STATUS_CLOSED.into();
        case.date_closed = Some(at_noon(2024, 1, 10));
        // Now is far in the future, but the case closed at day 9.
        let stats = compute(&[case], &[], 0, at_noon(2024, 6, 1));
        assert_eq!(stats.tat_breach, 0);
    }

    #[test]
    fn closed_without_close_date_falls_back_to_now() {
        let mut case = open_case("Scam", "Mule", day(2024, 1, 1));
        case.status = STATUS_CLOSED.into();
        case.date_closed = None;
        let stats = compute(&[case], &[], 0, at_noon(2024, 6, 1));
        assert_eq!(stats.tat_breach, 1);
    }

    #[test]
    fn classification_and_mo_tallies() {
        let cases = [
            open_case("Fraud", "Phishing", day(2024, 1, 1)),
            open_case("Fraud", "Phishing", day(2024, 1, 2)),
            open_case("Scam", "Mule", day(2024, 1, 3)),
            open_case("Non-Fraud", "Dispute", day(2024, 1, 4)),
        ];
        let stats = compute(&cases, &[], 0, at_noon(2024, 1, 5));
        assert_eq!(
            stats.classification,
            ClassificationCounts {
                fraud: 2,
                scam: 1,
                non_fraud: 1
            }
        );
        assert_eq!(stats.mo_breakdown["Phishing"], 2);
        assert_eq!(stats.mo_breakdown["Mule"], 1);
        assert_eq!(stats.total_exec_cases, 4);
    }

    #[test]
    fn rpp_tallies_by_bank_and_month() {
        let rpp = [
            RppSnapshot {
                bank_name: Some("Alpha Bank".into()),
                date_received: day(2024, 2, 1),
                month_received: "2024-02".into(),
            },
            RppSnapshot {
                bank_name: Some("Alpha Bank".into()),
                date_received: day(2024, 2, 20),
                month_received: "2024-02".into(),
            },
            RppSnapshot {
                bank_name: None,
                date_received: day(2024, 3, 2),
                // Empty month falls back to the receipt date.
                month_received: String::new(),
            },
        ];
        let stats = compute(&[], &rpp, 3, at_noon(2024, 3, 10));
        assert_eq!(stats.total_rpp_cases, 3);
        assert_eq!(stats.pending_close_requests, 3);
        assert_eq!(stats.bank_breakdown["Alpha Bank"], 2);
        assert_eq!(stats.bank_breakdown.len(), 1);
        assert_eq!(stats.rpp_monthly["2024-02"], 2);
        assert_eq!(stats.rpp_monthly["2024-03"], 1);
    }
}
