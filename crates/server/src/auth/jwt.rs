use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims stored in the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub username: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").expect("JWT_SECRET must be set")
}

pub fn token_expiry_hours() -> i64 {
    std::env::var("JWT_TOKEN_EXPIRY_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(24)
}

/// Issue a session token for the given user.
pub fn create_token(
    user_id: i64,
    username: &str,
    role: &str,
    full_name: Option<&str>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role: role.to_string(),
        full_name: full_name.map(|s| s.to_string()),
        iat: now.timestamp(),
        exp: (now + Duration::hours(token_expiry_hours())).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
}

/// Validate a session token and return its claims.
pub fn validate_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_secret() {
        std::env::set_var("JWT_SECRET", "test-secret-key-for-jwt-unit-tests");
    }

    #[test]
    fn create_and_validate_token() {
        setup_test_secret();
        let token = create_token(42, "amira", "exec", Some("Amira Binti")).unwrap();
        let claims = validate_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "amira");
        assert_eq!(claims.role, "exec");
        assert_eq!(claims.full_name.as_deref(), Some("Amira Binti"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_rejected() {
        setup_test_secret();
        let now = Utc::now();
        let claims = Claims {
            sub: 1,
            username: "expired".to_string(),
            role: "officer".to_string(),
            full_name: None,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret().as_bytes()),
        )
        .unwrap();

        let err = validate_token(&token).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn invalid_token_rejected() {
        setup_test_secret();
        assert!(validate_token("not.a.valid.jwt").is_err());
        assert!(validate_token("").is_err());
    }

    #[test]
    fn full_name_is_optional() {
        setup_test_secret();
        let token = create_token(7, "ops", "superadmin", None).unwrap();
        let claims = validate_token(&token).unwrap();
        assert!(claims.full_name.is_none());
    }
}
