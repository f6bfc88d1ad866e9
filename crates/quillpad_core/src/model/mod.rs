//! Domain model for the multi-tenant note-taking core.
//!
//! # Responsibility
//! - Define the canonical user/note/tag records shared by all callers.
//! - Provide constructor defaults and timestamp helpers.
//!
//! # Invariants
//! - Every record carries a stable uuid that is never reused.
//! - `owner_id` on notes and tags is immutable after creation.
//! - `created_at == updated_at` at creation time.

pub mod note;
pub mod tag;
pub mod user;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
