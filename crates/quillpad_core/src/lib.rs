//! Core domain logic for Quillpad, a multi-tenant note-taking service.
//! This crate is the single source of truth for credential lifecycle and
//! referential-integrity invariants; transport façades stay thin.

pub mod auth;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use auth::credential_store::{AuthError, CredentialStore};
pub use auth::password::HashingError;
pub use auth::token::{RevocationEntry, TokenAuthority, TokenError, TokenIdentity};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId};
pub use model::tag::{Tag, TagId};
pub use model::user::{User, UserId};
pub use service::core_service::{
    CoreConfig, CoreError, CoreService, LoginSession, NewNote, NoteFilter, NotePatch,
    ProfilePatch, TagPatch,
};
pub use storage::{
    JsonSnapshotStore, MemorySnapshotStore, PersistenceGateway, SnapshotData, SnapshotError,
};
pub use store::entity_store::{EntityStore, OwnedEntity, StoreError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
