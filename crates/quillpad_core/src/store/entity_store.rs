//! Generic owner-scoped entity collection.
//!
//! # Responsibility
//! - Provide create/read/update/delete over one in-memory collection.
//! - Enforce owner-scoped visibility on every lookup.
//!
//! # Invariants
//! - A row belonging to another owner always reads as `NotFound`, never as
//!   a permission error (prevents cross-tenant information leakage).
//! - `update` refreshes `updated_at`; `created_at` stays immutable because
//!   mutation goes through `touch`, never field replacement.
//! - List results are returned in insertion order, eagerly materialized.

use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Collection-level error for owner-scoped lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Row absent, or owned by a different user.
    NotFound(Uuid),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Contract for rows held in an [`EntityStore`].
pub trait OwnedEntity {
    /// Stable row identifier.
    fn id(&self) -> Uuid;
    /// Owning user; immutable after creation.
    fn owner_id(&self) -> UserId;
    /// Refreshes the row's `updated_at` timestamp.
    fn touch(&mut self, now_ms: i64);
}

/// In-memory collection of one entity type, scoped by owner on every read.
#[derive(Debug, Default)]
pub struct EntityStore<T: OwnedEntity> {
    rows: Vec<T>,
}

impl<T: OwnedEntity> EntityStore<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Rebuilds a collection from snapshot rows, preserving order.
    pub fn from_rows(rows: Vec<T>) -> Self {
        Self { rows }
    }

    /// Borrows all rows, snapshot order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends one row. The caller is responsible for id freshness.
    pub fn insert(&mut self, entity: T) -> &T {
        self.rows.push(entity);
        &self.rows[self.rows.len() - 1]
    }

    /// Owner-scoped point lookup.
    pub fn get(&self, id: Uuid, owner_id: UserId) -> StoreResult<&T> {
        self.rows
            .iter()
            .find(|row| row.id() == id && row.owner_id() == owner_id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Owner-scoped list with an optional predicate, insertion order.
    pub fn list<F>(&self, owner_id: UserId, predicate: F) -> Vec<&T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .iter()
            .filter(|row| row.owner_id() == owner_id && predicate(row))
            .collect()
    }

    /// Owner-scoped mutation through a closure; refreshes `updated_at`.
    pub fn update<F>(&mut self, id: Uuid, owner_id: UserId, now_ms: i64, apply: F) -> StoreResult<&T>
    where
        F: FnOnce(&mut T),
    {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id() == id && row.owner_id() == owner_id)
            .ok_or(StoreError::NotFound(id))?;
        apply(row);
        row.touch(now_ms);
        Ok(row)
    }

    /// Owner-scoped removal, returning the removed row.
    pub fn delete(&mut self, id: Uuid, owner_id: UserId) -> StoreResult<T> {
        let position = self
            .rows
            .iter()
            .position(|row| row.id() == id && row.owner_id() == owner_id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.rows.remove(position))
    }

    /// Mutates every row of one owner for which `apply` reports a change.
    ///
    /// Rows reporting `true` get their `updated_at` refreshed; untouched
    /// rows keep their timestamps. Returns the number of changed rows.
    pub fn update_owned<F>(&mut self, owner_id: UserId, now_ms: i64, mut apply: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut changed = 0;
        for row in self.rows.iter_mut().filter(|row| row.owner_id() == owner_id) {
            if apply(row) {
                row.touch(now_ms);
                changed += 1;
            }
        }
        changed
    }

    /// Removes and returns every row of one owner, preserving order.
    ///
    /// Backs the user-delete cascade; scoping by owner only keeps other
    /// tenants' rows untouched even on colliding ids.
    pub fn remove_owned(&mut self, owner_id: UserId) -> Vec<T> {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.rows.len() {
            if self.rows[index].owner_id() == owner_id {
                removed.push(self.rows.remove(index));
            } else {
                index += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, StoreError};
    use crate::model::tag::Tag;
    use uuid::Uuid;

    #[test]
    fn get_is_owner_scoped() {
        let owner_a = Uuid::new_v4();
        let owner_b = Uuid::new_v4();
        let mut store = EntityStore::new();
        let tag = Tag::new(owner_a, "work", 1_000);
        let tag_id = tag.id;
        store.insert(tag);

        assert!(store.get(tag_id, owner_a).is_ok());
        // Foreign owner reads the same as a missing row.
        assert_eq!(
            store.get(tag_id, owner_b).unwrap_err(),
            StoreError::NotFound(tag_id)
        );
    }

    #[test]
    fn list_preserves_insertion_order() {
        let owner = Uuid::new_v4();
        let mut store = EntityStore::new();
        let first = Tag::new(owner, "first", 1_000);
        let second = Tag::new(owner, "second", 1_000);
        let (first_id, second_id) = (first.id, second.id);
        store.insert(first);
        store.insert(second);

        let listed = store.list(owner, |_| true);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first_id);
        assert_eq!(listed[1].id, second_id);
    }

    #[test]
    fn update_touches_only_updated_at() {
        let owner = Uuid::new_v4();
        let mut store = EntityStore::new();
        let tag = Tag::new(owner, "draft", 1_000);
        let tag_id = tag.id;
        store.insert(tag);

        let updated = store
            .update(tag_id, owner, 2_000, |row| row.name = "final".to_string())
            .unwrap();
        assert_eq!(updated.name, "final");
        assert_eq!(updated.created_at, 1_000);
        assert_eq!(updated.updated_at, 2_000);
    }

    #[test]
    fn remove_owned_leaves_other_tenants_alone() {
        let owner_a = Uuid::new_v4();
        let owner_b = Uuid::new_v4();
        let mut store = EntityStore::new();
        store.insert(Tag::new(owner_a, "a1", 1_000));
        store.insert(Tag::new(owner_b, "b1", 1_000));
        store.insert(Tag::new(owner_a, "a2", 1_000));

        let removed = store.remove_owned(owner_a);
        assert_eq!(removed.len(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.rows()[0].owner_id, owner_b);
    }
}
