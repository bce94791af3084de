use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::jwt::{self, Claims};

/// Why bearer-token validation failed, kept around so `AuthRequired`
/// can report expiry distinctly from a malformed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Expired,
    Invalid,
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Permissive auth middleware.
///
/// Validates the bearer token, if any, and inserts `Claims` into request
/// extensions. Does NOT reject unauthenticated requests; downstream
/// handlers decide authorization via the `AuthRequired` extractor.
pub async fn auth_middleware(mut req: Request, next: Next) -> Response {
    if let Some(token) = extract_bearer_token(req.headers()) {
        match jwt::validate_token(&token) {
            Ok(claims) => {
                req.extensions_mut().insert::<Claims>(claims);
            }
            Err(err) => {
                let failure = match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthFailure::Expired,
                    _ => AuthFailure::Invalid,
                };
                req.extensions_mut().insert(failure);
            }
        }
    }

    next.run(req).await
}
