use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub user_metadata: Option<serde_json::Value>,
    pub iat: Option<u64>,
}

/// Account role supplied by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    General,
    Admin,
    Expert,
}

impl Role {
    /// Parses the role claim. Unknown or missing roles are treated as `General`.
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim.map(|r| r.to_ascii_uppercase()).as_deref() {
            Some("ADMIN") => Role::Admin,
            Some("EXPERT") => Role::Expert,
            _ => Role::General,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::General => write!(f, "GENERAL"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Expert => write!(f, "EXPERT"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_expert(&self) -> bool {
        self.role == Role::Expert
    }
}
