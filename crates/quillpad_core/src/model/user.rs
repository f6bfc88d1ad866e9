//! User account records.
//!
//! # Responsibility
//! - Define the persisted account row and its sanitized read model.
//!
//! # Invariants
//! - `password_hash` and `salt` never leave the auth layer; callers only
//!   ever see [`User`].
//! - `username` is unique across the collection (case-sensitive).

use super::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registered user.
pub type UserId = Uuid;

/// Persisted account row, including credential material.
///
/// Owned exclusively by the credential store; only serialized into the
/// snapshot, never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed on profile updates.
    pub updated_at: i64,
}

impl UserRecord {
    /// Creates a new account row with a generated stable ID.
    pub fn new(username: impl Into<String>, password_hash: String, salt: String) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash,
            salt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Projects this row into the credential-free read model.
    pub fn to_public(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Sanitized account view returned by every auth operation.
///
/// Serialized in camelCase to match the external schema naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: i64,
    pub updated_at: i64,
}
