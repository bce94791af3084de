use axum::{extract::FromRequestParts, http::request::Parts};
use shared_types::{AppError, Role};

use super::jwt::Claims;
use super::middleware::AuthFailure;

/// The authenticated actor. Threaded explicitly into every repo
/// operation rather than read from ambient request state.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub username: String,
    pub full_name: Option<String>,
}

impl Actor {
    fn from_claims(claims: Claims) -> Result<Self, AppError> {
        let role = Role::parse(&claims.role)
            .ok_or_else(|| AppError::unauthorized("Invalid token"))?;
        Ok(Self {
            id: claims.sub,
            role,
            username: claims.username,
            full_name: claims.full_name,
        })
    }
}

/// Extractor that requires authentication. Returns 401 if no valid token,
/// distinguishing an expired token from a malformed one.
pub struct AuthRequired(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for AuthRequired {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Actor::from_claims(claims).map(AuthRequired);
        }

        Err(match parts.extensions.get::<AuthFailure>() {
            Some(AuthFailure::Expired) => AppError::unauthorized("Token expired"),
            Some(AuthFailure::Invalid) => AppError::unauthorized("Invalid token"),
            None => AppError::unauthorized("No token provided"),
        })
    }
}

/// Require that the actor satisfies a role gate. Superadmin passes every
/// gate; this is never used for the PIC-only ownership check.
pub fn require_role(actor: &Actor, required: Role) -> Result<(), AppError> {
    if actor.role.satisfies(required) {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient permissions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: 1,
            role,
            username: "someone".into(),
            full_name: None,
        }
    }

    #[test]
    fn superadmin_passes_all_gates() {
        for required in Role::ALL {
            assert!(require_role(&actor(Role::Superadmin), required).is_ok());
        }
    }

    #[test]
    fn role_gates_are_lane_scoped() {
        assert!(require_role(&actor(Role::Exec), Role::Exec).is_ok());
        assert!(require_role(&actor(Role::Exec), Role::Senior).is_err());
        assert!(require_role(&actor(Role::Officer), Role::Exec).is_err());
        assert!(require_role(&actor(Role::Senior), Role::Senior).is_ok());
    }

    #[test]
    fn unknown_role_claim_is_rejected() {
        let claims = Claims {
            sub: 9,
            username: "ghost".into(),
            role: "wizard".into(),
            full_name: None,
            iat: 0,
            exp: 0,
        };
        assert!(Actor::from_claims(claims).is_err());
    }
}
