use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business roles. Flat lattice: superadmin satisfies every role gate,
/// the other three only satisfy themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Senior,
    Exec,
    Officer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Superadmin, Role::Senior, Role::Exec, Role::Officer];

    /// Parse from the JWT `role` claim or a request body. Unknown values
    /// are rejected rather than defaulted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "superadmin" => Some(Role::Superadmin),
            "senior" => Some(Role::Senior),
            "exec" => Some(Role::Exec),
            "officer" => Some(Role::Officer),
            _ => None,
        }
    }

    /// Lowercase string for database / JWT storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Senior => "senior",
            Role::Exec => "exec",
            Role::Officer => "officer",
        }
    }

    /// Returns true if this role satisfies the `required` role gate.
    /// Superadmin passes all gates; the lanes are otherwise disjoint.
    /// NOTE: ownership checks (the PIC-only direct close) are separate
    /// and do not consult this.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == Role::Superadmin || *self == required
    }
}

/// A user row. `password_hash` never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_username: Option<String>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role,
            full_name: u.full_name,
            is_active: u.is_active,
            created_at: u.created_at,
            created_by_username: None,
        }
    }
}

/// Minimal user reference for PIC dropdowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
}

/// Request body for POST /api/auth/login.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

/// Request body for creating a user (superadmin only).
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial patch for a user (superadmin only).
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserEnvelope {
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UsersEnvelope {
    pub users: Vec<UserView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserSummariesEnvelope {
    pub users: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_roles_case_insensitively() {
        assert_eq!(Role::parse("exec"), Some(Role::Exec));
        assert_eq!(Role::parse("SENIOR"), Some(Role::Senior));
        assert_eq!(Role::parse("Superadmin"), Some(Role::Superadmin));
        assert_eq!(Role::parse("officer"), Some(Role::Officer));
    }

    #[test]
    fn parse_rejects_unknown_roles() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("clerk"), None);
    }

    #[test]
    fn superadmin_satisfies_every_gate() {
        for required in Role::ALL {
            assert!(Role::Superadmin.satisfies(required));
        }
    }

    #[test]
    fn lanes_are_disjoint() {
        assert!(Role::Exec.satisfies(Role::Exec));
        assert!(!Role::Exec.satisfies(Role::Senior));
        assert!(!Role::Exec.satisfies(Role::Officer));
        assert!(!Role::Senior.satisfies(Role::Exec));
        assert!(!Role::Officer.satisfies(Role::Senior));
        assert!(!Role::Senior.satisfies(Role::Superadmin));
    }

    #[test]
    fn roundtrip_through_as_str() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: 1,
            username: "amira".into(),
            password_hash: "argon2-secret".into(),
            role: "exec".into(),
            full_name: None,
            is_active: true,
            last_login: None,
            created_by: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-secret"));
        assert!(!json.contains("password_hash"));
    }
}
