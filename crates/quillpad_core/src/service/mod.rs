//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate credential, token and entity stores into the operation
//!   surface consumed by transport façades.
//! - Own cross-collection consistency (cascading deletes) and persistence
//!   write-through.

pub mod core_service;
