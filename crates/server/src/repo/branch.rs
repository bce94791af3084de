use shared_types::{AppError, Branch};
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;

/// Look up a branch by its code.
pub async fn find_by_code(
    pool: &Pool<Postgres>,
    code: &str,
) -> Result<Option<Branch>, AppError> {
    let row = sqlx::query_as::<_, Branch>(
        r#"
        SELECT branch_code, branch_name, region, state
        FROM branch_master
        WHERE branch_code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List all branches ordered by code.
pub async fn list(pool: &Pool<Postgres>) -> Result<Vec<Branch>, AppError> {
    let rows = sqlx::query_as::<_, Branch>(
        r#"
        SELECT branch_code, branch_name, region, state
        FROM branch_master
        ORDER BY branch_code
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}
