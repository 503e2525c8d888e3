//! Bearer session records.

use serde::{Deserialize, Serialize};

/// A bearer session.
///
/// The token is opaque and never mutated after issuance; a session is
/// either present (possibly expired) or deleted. Validity is checked at
/// read time: a session is valid iff `expires_at` is strictly in the
/// future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Opaque high-entropy token.
    pub token: String,
    /// Id of the owning user (not enforced as a foreign key).
    pub user_id: u64,
    /// Issuance time, unix milliseconds.
    pub created_at: u64,
    /// Expiry time, unix milliseconds.
    pub expires_at: u64,
}

impl SessionRecord {
    /// Returns whether the session is still valid at `now_ms`.
    #[must_use]
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        self.expires_at > now_ms
    }
}
