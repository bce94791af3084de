use axum::{extract::State, Json};
use sqlx::{Pool, Postgres};

use crate::auth::extractors::{require_role, AuthRequired};
use crate::repo;
use shared_types::{AppError, Role, StatisticsEnvelope};

// ---------------------------------------------------------------------------
// GET /api/statistics
// ---------------------------------------------------------------------------

/// Aggregated rollups over the current case state: totals, TAT breaches,
/// classification/MO/bank/month tallies, and the pending-approval count.
#[utoipa::path(
    get,
    path = "/api/statistics",
    responses(
        (status = 200, description = "Current statistics", body = StatisticsEnvelope),
        (status = 403, description = "Senior role required", body = AppError)
    ),
    tag = "statistics"
)]
pub async fn get_statistics(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<StatisticsEnvelope>, AppError> {
    require_role(&auth.0, Role::Senior)?;

    let statistics = repo::statistics::gather(&pool).await?;
    Ok(Json(StatisticsEnvelope { statistics }))
}
