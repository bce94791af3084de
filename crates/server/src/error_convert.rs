use shared_types::AppError;

/// Convert a sqlx::Error into an AppError.
///
/// Unique-constraint violations become friendly conflicts so that a
/// duplicate slipping past an engine pre-check still surfaces as a clean
/// 409 rather than a 500.
pub fn sqlx_to_app_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::not_found("Resource not found"),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation (error code 23505)
            if db_err.code().as_deref() == Some("23505") {
                return AppError::conflict(friendly_conflict(db_err.message()));
            }
            log::error!("database error: {err}");
            AppError::database("Database operation failed")
        }
        _ => {
            log::error!("database error: {err}");
            AppError::database("Database operation failed")
        }
    }
}

/// Map a unique-violation detail message onto the constraint it tripped.
fn friendly_conflict(detail: &str) -> &'static str {
    if detail.contains("case_id") {
        "Case ID already exists"
    } else if detail.contains("bmid") {
        "An entry for this BMID and source type already exists"
    } else if detail.contains("username") {
        "Username already exists"
    } else {
        "A record with this value already exists"
    }
}

/// Extension trait providing `.into_app_error()` on sqlx::Error.
pub trait SqlxErrorExt {
    fn into_app_error(self) -> AppError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_app_error(self) -> AppError {
        sqlx_to_app_error(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::AppErrorKind;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = sqlx_to_app_error(sqlx::Error::RowNotFound);
        assert_eq!(err.kind, AppErrorKind::NotFound);
    }

    #[test]
    fn friendly_conflict_recognizes_constraints() {
        assert_eq!(
            friendly_conflict("duplicate key value violates unique constraint \"exec_cases_case_id_key\""),
            "Case ID already exists"
        );
        assert_eq!(
            friendly_conflict("duplicate key value violates unique constraint \"rpp_cases_bmid_source_type_key\""),
            "An entry for this BMID and source type already exists"
        );
        assert_eq!(
            friendly_conflict("duplicate key value violates unique constraint \"users_username_key\""),
            "Username already exists"
        );
        assert_eq!(
            friendly_conflict("something else"),
            "A record with this value already exists"
        );
    }

    #[test]
    fn other_errors_are_opaque() {
        let err = sqlx_to_app_error(sqlx::Error::PoolClosed);
        assert_eq!(err.kind, AppErrorKind::Database);
        assert_eq!(err.message, "Database operation failed");
    }
}
