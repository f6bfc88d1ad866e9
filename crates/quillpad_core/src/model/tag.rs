//! Tag records.
//!
//! # Invariants
//! - `owner_id` is immutable after creation.
//! - Tag names are NOT unique per owner; duplicates are legal.

use super::user::UserId;
use crate::store::entity_store::OwnedEntity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tag.
pub type TagId = Uuid;

/// Tag row owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub owner_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Tag {
    /// Creates a new tag with a generated stable ID.
    pub fn new(owner_id: UserId, name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}

impl OwnedEntity for Tag {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn touch(&mut self, now_ms: i64) {
        self.updated_at = now_ms;
    }
}
