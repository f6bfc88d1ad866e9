//! In-memory collection layer.
//!
//! # Responsibility
//! - Define owner-scoped data access contracts over the in-memory working
//!   set.
//! - Keep cross-collection orchestration (cascades, persistence) out; that
//!   belongs to the service layer.
//!
//! # Invariants
//! - Every lookup is owner-scoped: rows of another owner are
//!   indistinguishable from absent rows.
//! - Collections preserve insertion order for list results.

pub mod entity_store;
