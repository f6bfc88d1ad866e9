//! Note records.
//!
//! # Responsibility
//! - Define the note row with its owner relation and weak tag references.
//!
//! # Invariants
//! - `owner_id` is immutable after creation.
//! - `tag_ids` holds references, not ownership: a note never owns a tag and
//!   a dangling tag id is not an error.
//! - `created_at` is immutable; `updated_at` is refreshed on every change.

use super::tag::TagId;
use super::user::UserId;
use crate::store::entity_store::OwnedEntity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Note row owned by exactly one user.
///
/// Serialized in camelCase to match the external schema naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Ordered weak references to tags of the same owner.
    pub tag_ids: Vec<TagId>,
    pub owner_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    pub archived: bool,
    pub color: String,
}

impl Note {
    /// Creates a new note with defaults: not archived, empty tag set.
    pub fn new(
        owner_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
        color: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            tag_ids: Vec::new(),
            owner_id,
            created_at: now_ms,
            updated_at: now_ms,
            archived: false,
            color: color.into(),
        }
    }

    /// Returns whether this note references the given tag.
    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tag_ids.contains(&tag_id)
    }
}

impl OwnedEntity for Note {
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
