//! Durable snapshot persistence boundary.
//!
//! # Responsibility
//! - Define the persistence contract the core writes through after every
//!   mutation.
//! - Keep encoding details inside the gateway implementations.
//!
//! # Invariants
//! - The snapshot holds four independent collections (users, notes, tags,
//!   revocations); each is rewritten in full on save.
//! - Saving is NOT atomic across the four collections; a crash mid-save can
//!   leave them mutually inconsistent. Documented limitation.

use crate::auth::token::RevocationEntry;
use crate::model::note::Note;
use crate::model::tag::Tag;
use crate::model::user::UserRecord;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod snapshot;

pub use snapshot::{JsonSnapshotStore, MemorySnapshotStore};

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Persistence-layer failure.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    /// A collection file exists but does not decode.
    Decode {
        collection: &'static str,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Decode { collection, source } => {
                write!(f, "invalid persisted `{collection}` collection: {source}")
            }
            Self::Encode(err) => write!(f, "snapshot encoding failed: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Full working set as persisted: four flat record collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub users: Vec<UserRecord>,
    pub notes: Vec<Note>,
    pub tags: Vec<Tag>,
    pub revocations: Vec<RevocationEntry>,
}

/// Contract for durable snapshot storage.
///
/// Loaded once at startup, rewritten in full after every mutating
/// operation.
pub trait PersistenceGateway {
    /// Loads the full working set; an absent store reads as empty.
    fn load(&mut self) -> SnapshotResult<SnapshotData>;
    /// Rewrites the full working set.
    fn save(&mut self, data: &SnapshotData) -> SnapshotResult<()>;
}
