//! User records and their public projection.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrative account.
    Admin,
    /// Regular account.
    User,
}

/// A stored user account.
///
/// `salt` and `password_hash` never leave this crate; every external
/// consumer receives a [`PublicUser`] projection instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique, monotonically assigned identifier.
    pub id: u64,
    /// Email, stored trimmed and lowercased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Age in years, if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Hex-encoded random salt.
    pub salt: String,
    /// Hex-encoded PBKDF2 output.
    pub password_hash: String,
    /// Account role, if assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// A user view with the credential fields removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// Unique identifier.
    pub id: u64,
    /// Email, normalized.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Age in years, if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Account role, if assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl From<&UserRecord> for PublicUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            name: record.name.clone(),
            age: record.age,
            created_at: record.created_at,
            role: record.role,
        }
    }
}
