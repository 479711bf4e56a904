use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::{Privilege, Role};

/// A time-bounded privilege addition layered on top of a user's role-derived
/// set. Expiry is evaluated lazily wherever privileges are checked; nothing
/// sweeps expired grants out of the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryGrant {
    pub privileges: Vec<Privilege>,
    pub granted_by: Uuid,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TemporaryGrant {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercased; uniqueness is case-insensitive.
    pub email: String,
    /// Bcrypt hash, never the plaintext. Skipped on every serialized response.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub temporary_grants: Vec<TemporaryGrant>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email: email.to_lowercase(),
            password_hash,
            role,
            is_active: true,
            temporary_grants: Vec::new(),
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Grants still in effect at `now`.
    pub fn active_grants(&self, now: DateTime<Utc>) -> impl Iterator<Item = &TemporaryGrant> {
        self.temporary_grants.iter().filter(move |g| g.is_active(now))
    }
}
