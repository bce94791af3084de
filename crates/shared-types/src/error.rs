use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorization of application errors.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AppErrorKind {
    NotFound,
    BadRequest,
    Validation,
    Conflict,
    Unauthorized,
    Forbidden,
    RateLimited,
    Database,
    #[default]
    Internal,
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::NotFound => write!(f, "NotFound"),
            AppErrorKind::BadRequest => write!(f, "BadRequest"),
            AppErrorKind::Validation => write!(f, "Validation"),
            AppErrorKind::Conflict => write!(f, "Conflict"),
            AppErrorKind::Unauthorized => write!(f, "Unauthorized"),
            AppErrorKind::Forbidden => write!(f, "Forbidden"),
            AppErrorKind::RateLimited => write!(f, "RateLimited"),
            AppErrorKind::Database => write!(f, "Database"),
            AppErrorKind::Internal => write!(f, "Internal"),
        }
    }
}

/// Structured application error. Serializes on the wire as a single
/// `{"error": "..."}` object; the kind only drives the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppError {
    #[serde(skip)]
    pub kind: AppErrorKind,
    #[serde(rename = "error")]
    pub message: String,
}

impl AppError {
    fn new(kind: AppErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::BadRequest, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Conflict, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Forbidden, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::RateLimited, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Database, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Internal, message)
    }

    #[cfg_attr(not(feature = "server"), allow(dead_code))]
    fn status_code_u16(&self) -> u16 {
        match self.kind {
            AppErrorKind::NotFound => 404,
            AppErrorKind::BadRequest => 400,
            AppErrorKind::Validation => 400,
            AppErrorKind::Conflict => 409,
            AppErrorKind::Unauthorized => 401,
            AppErrorKind::Forbidden => 403,
            AppErrorKind::RateLimited => 429,
            AppErrorKind::Database => 500,
            AppErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code_u16())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_single_error_field() {
        let err = AppError::conflict("Case ID already exists");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Case ID already exists" }));
    }

    #[test]
    fn kind_is_not_leaked_on_the_wire() {
        let json = serde_json::to_string(&AppError::forbidden("nope")).unwrap();
        assert!(!json.contains("Forbidden"));
        assert!(!json.contains("kind"));
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(AppError::not_found("").status_code_u16(), 404);
        assert_eq!(AppError::bad_request("").status_code_u16(), 400);
        assert_eq!(AppError::validation("").status_code_u16(), 400);
        assert_eq!(AppError::conflict("").status_code_u16(), 409);
        assert_eq!(AppError::unauthorized("").status_code_u16(), 401);
        assert_eq!(AppError::forbidden("").status_code_u16(), 403);
        assert_eq!(AppError::rate_limited("").status_code_u16(), 429);
        assert_eq!(AppError::database("").status_code_u16(), 500);
        assert_eq!(AppError::internal("").status_code_u16(), 500);
    }

    #[test]
    fn display_impl_formats_correctly() {
        let err = AppError::unauthorized("bad credentials");
        assert_eq!(format!("{}", err), "Unauthorized: bad credentials");
    }

    #[test]
    fn deserializes_error_body() {
        let parsed: AppError = serde_json::from_str(r#"{"error":"Case not found"}"#).unwrap();
        assert_eq!(parsed.message, "Case not found");
    }
}
