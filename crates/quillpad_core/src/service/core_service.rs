//! Top-level coordinator over all four collections.
//!
//! # Responsibility
//! - Expose the account/note/tag operation surface for both façades.
//! - Orchestrate cascading deletes across collections.
//! - Write the full snapshot through the persistence gateway after every
//!   mutating operation.
//!
//! # Invariants
//! - Validation happens before any mutation: a failing operation performs
//!   no partial side effects.
//! - Cascades persist once at the end, not per touched row.
//! - User cascade order is notes, then tags, then the user row, so a crash
//!   mid-cascade never leaves dependents pointing at a removed owner.
//! - A snapshot write failure does not roll back memory; the operation
//!   still reports success (availability over durability).

use crate::auth::credential_store::{AuthError, CredentialStore};
use crate::auth::token::{TokenAuthority, TokenError, TokenIdentity, DEFAULT_TOKEN_TTL_MS};
use crate::model::note::{Note, NoteId};
use crate::model::now_epoch_ms;
use crate::model::tag::{Tag, TagId};
use crate::model::user::{User, UserId};
use crate::storage::{PersistenceGateway, SnapshotData, SnapshotError};
use crate::store::entity_store::EntityStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Note color applied when a request does not supply one.
pub const DEFAULT_NOTE_COLOR: &str = "#ffffff";

pub type CoreResult<T> = Result<T, CoreError>;

/// Unified failure surface crossing the core boundary.
///
/// Leaf layers keep their own error enums; this one preserves each failure
/// kind so façades can map to status codes without string matching.
#[derive(Debug)]
pub enum CoreError {
    InvalidUsername(String),
    DuplicateUsername(String),
    InvalidCredentials,
    UserNotFound(UserId),
    NoteNotFound(NoteId),
    TagNotFound(TagId),
    InvalidTagName,
    Token(TokenError),
    /// Snapshot load failure at startup.
    Snapshot(SnapshotError),
    /// Internal failure (hashing, encoding); details go to the log only.
    Internal,
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(f, "invalid username: `{value}`"),
            Self::DuplicateUsername(value) => write!(f, "username already taken: `{value}`"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::InvalidTagName => write!(f, "tag name cannot be empty"),
            Self::Token(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Token(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthError> for CoreError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidUsername(name) => Self::InvalidUsername(name),
            AuthError::DuplicateUsername(name) => Self::DuplicateUsername(name),
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::NotFound(id) => Self::UserNotFound(id),
            AuthError::Hashing(err) => {
                log::error!("event=hashing module=core status=error error={err}");
                Self::Internal
            }
        }
    }
}

impl From<TokenError> for CoreError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Encode(details) => {
                log::error!("event=token_encode module=core status=error error={details}");
                Self::Internal
            }
            other => Self::Token(other),
        }
    }
}

/// Startup configuration for the core.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Process-wide token signing secret, provisioned externally.
    pub secret: String,
    /// Token lifetime in milliseconds.
    pub token_ttl_ms: i64,
    /// Color applied to notes created without one.
    pub default_note_color: String,
}

impl CoreConfig {
    /// Builds a config with the default TTL (24h) and note color.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_ms: DEFAULT_TOKEN_TTL_MS,
            default_note_color: DEFAULT_NOTE_COLOR.to_string(),
        }
    }
}

/// Successful login outcome: sanitized account plus a fresh bearer token.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub token: String,
}

/// Profile update request; unset fields keep their prior value.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Note creation request. Unset optionals take per-type defaults.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tag_ids: Vec<TagId>,
    pub color: Option<String>,
}

/// Partial note update; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag_ids: Option<Vec<TagId>>,
    pub archived: Option<bool>,
    pub color: Option<String>,
}

/// Partial tag update.
#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
}

/// Predicate options for note listing.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub archived: Option<bool>,
    pub tag_id: Option<TagId>,
}

/// The core service consumed by both façades.
///
/// Designed to run behind a single-threaded or lock-protected dispatcher:
/// mutating operations take `&mut self` and the collections carry no
/// internal synchronization.
pub struct CoreService {
    config: CoreConfig,
    credentials: CredentialStore,
    tokens: TokenAuthority,
    notes: EntityStore<Note>,
    tags: EntityStore<Tag>,
    gateway: Box<dyn PersistenceGateway>,
}

impl CoreService {
    /// Loads the working set from the gateway and builds the service.
    pub fn open(config: CoreConfig, mut gateway: Box<dyn PersistenceGateway>) -> CoreResult<Self> {
        let data = gateway.load().map_err(CoreError::Snapshot)?;
        let service = Self {
            credentials: CredentialStore::from_records(data.users),
            tokens: TokenAuthority::with_revocations(
                config.secret.as_bytes().to_vec(),
                config.token_ttl_ms,
                data.revocations,
            ),
            notes: EntityStore::from_rows(data.notes),
            tags: EntityStore::from_rows(data.tags),
            config,
            gateway,
        };
        info!(
            "event=core_open module=service status=ok users={} notes={} tags={} revocations={}",
            service.credentials.len(),
            service.notes.len(),
            service.tags.len(),
            service.tokens.revocation_count()
        );
        Ok(service)
    }

    // ── Accounts & sessions ─────────────────────────────────────────

    /// Registers a new account.
    pub fn register(&mut self, username: &str, password: &str) -> CoreResult<User> {
        let user = self.credentials.register(username, password)?;
        self.persist();
        Ok(user)
    }

    /// Authenticates and issues a bearer token.
    pub fn login(&mut self, username: &str, password: &str) -> CoreResult<LoginSession> {
        let user = self.credentials.authenticate(username, password)?;
        let token = self.tokens.issue(&user)?;
        info!(
            "event=login module=service status=ok user_id={}",
            user.id
        );
        Ok(LoginSession { user, token })
    }

    /// Revokes the presented token.
    pub fn logout(&mut self, token: &str) -> CoreResult<()> {
        self.tokens.revoke(token)?;
        self.persist();
        Ok(())
    }

    /// Resolves a bearer token into an identity. Façades call this before
    /// dispatching any operation other than register/login.
    pub fn authorize(&self, token: &str) -> CoreResult<TokenIdentity> {
        Ok(self.tokens.verify(token)?)
    }

    /// Looks up one account's sanitized view.
    pub fn get_user(&self, user_id: UserId) -> CoreResult<User> {
        Ok(self.credentials.get(user_id)?)
    }

    /// Updates username and/or password.
    pub fn update_profile(&mut self, user_id: UserId, patch: ProfilePatch) -> CoreResult<User> {
        let user = self.credentials.update_profile(
            user_id,
            patch.username.as_deref(),
            patch.password.as_deref(),
        )?;
        self.persist();
        Ok(user)
    }

    /// Deletes an account and everything it owns.
    ///
    /// Cascade order is binding: notes, then tags, then the user row, with
    /// one persist at the end. Worst case under a crash is an orphaned
    /// note/tag with no owner, never a dependent of a removed owner.
    pub fn delete_user(&mut self, user_id: UserId) -> CoreResult<()> {
        if !self.credentials.contains(user_id) {
            return Err(CoreError::UserNotFound(user_id));
        }

        let removed_notes = self.notes.remove_owned(user_id).len();
        let removed_tags = self.tags.remove_owned(user_id).len();
        self.credentials.delete(user_id)?;
        info!(
            "event=user_cascade module=service status=ok user_id={} notes_removed={} tags_removed={}",
            user_id, removed_notes, removed_tags
        );
        self.persist();
        Ok(())
    }

    // ── Notes ───────────────────────────────────────────────────────

    /// Creates a note for the given owner.
    pub fn create_note(&mut self, owner_id: UserId, request: NewNote) -> CoreResult<Note> {
        if !self.credentials.contains(owner_id) {
            return Err(CoreError::UserNotFound(owner_id));
        }

        let color = request
            .color
            .unwrap_or_else(|| self.config.default_note_color.clone());
        let mut note = Note::new(
            owner_id,
            request.title,
            request.content,
            color,
            now_epoch_ms(),
        );
        // Tag references are weak and deliberately not validated against the
        // owner's tag collection.
        note.tag_ids = request.tag_ids;

        let created = self.notes.insert(note).clone();
        self.persist();
        Ok(created)
    }

    /// Owner-scoped note lookup.
    pub fn get_note(&self, note_id: NoteId, owner_id: UserId) -> CoreResult<Note> {
        self.notes
            .get(note_id, owner_id)
            .map(Clone::clone)
            .map_err(|_| CoreError::NoteNotFound(note_id))
    }

    /// Lists the owner's notes matching the filter, insertion order.
    pub fn list_notes(&self, owner_id: UserId, filter: &NoteFilter) -> Vec<Note> {
        self.notes
            .list(owner_id, |note| {
                filter.archived.map_or(true, |flag| note.archived == flag)
                    && filter.tag_id.map_or(true, |tag_id| note.has_tag(tag_id))
            })
            .into_iter()
            .cloned()
            .collect()
    }

    /// Applies a partial update to one note.
    pub fn update_note(
        &mut self,
        note_id: NoteId,
        owner_id: UserId,
        patch: NotePatch,
    ) -> CoreResult<Note> {
        let updated = self
            .notes
            .update(note_id, owner_id, now_epoch_ms(), |note| {
                if let Some(title) = patch.title {
                    note.title = title;
                }
                if let Some(content) = patch.content {
                    note.content = content;
                }
                if let Some(tag_ids) = patch.tag_ids {
                    note.tag_ids = tag_ids;
                }
                if let Some(archived) = patch.archived {
                    note.archived = archived;
                }
                if let Some(color) = patch.color {
                    note.color = color;
                }
            })
            .map_err(|_| CoreError::NoteNotFound(note_id))?
            .clone();
        self.persist();
        Ok(updated)
    }

    /// Deletes one note. No cascade; tags are never owned by notes.
    pub fn delete_note(&mut self, note_id: NoteId, owner_id: UserId) -> CoreResult<()> {
        self.notes
            .delete(note_id, owner_id)
            .map_err(|_| CoreError::NoteNotFound(note_id))?;
        self.persist();
        Ok(())
    }

    // ── Tags ────────────────────────────────────────────────────────

    /// Creates a tag. Names need not be unique per owner.
    pub fn create_tag(&mut self, owner_id: UserId, name: &str) -> CoreResult<Tag> {
        if !self.credentials.contains(owner_id) {
            return Err(CoreError::UserNotFound(owner_id));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidTagName);
        }

        let created = self
            .tags
            .insert(Tag::new(owner_id, name, now_epoch_ms()))
            .clone();
        self.persist();
        Ok(created)
    }

    /// Owner-scoped tag lookup.
    pub fn get_tag(&self, tag_id: TagId, owner_id: UserId) -> CoreResult<Tag> {
        self.tags
            .get(tag_id, owner_id)
            .map(Clone::clone)
            .map_err(|_| CoreError::TagNotFound(tag_id))
    }

    /// Lists the owner's tags, insertion order.
    pub fn list_tags(&self, owner_id: UserId) -> Vec<Tag> {
        self.tags
            .list(owner_id, |_| true)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Applies a partial update to one tag.
    pub fn update_tag(
        &mut self,
        tag_id: TagId,
        owner_id: UserId,
        patch: TagPatch,
    ) -> CoreResult<Tag> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(CoreError::InvalidTagName);
            }
        }

        let updated = self
            .tags
            .update(tag_id, owner_id, now_epoch_ms(), |tag| {
                if let Some(name) = patch.name {
                    tag.name = name.trim().to_string();
                }
            })
            .map_err(|_| CoreError::TagNotFound(tag_id))?
            .clone();
        self.persist();
        Ok(updated)
    }

    /// Deletes a tag and strips its id from every note of the same owner.
    ///
    /// Notes themselves are never deleted here, and other owners' notes
    /// stay untouched even when holding a colliding tag id.
    pub fn delete_tag(&mut self, tag_id: TagId, owner_id: UserId) -> CoreResult<()> {
        self.tags
            .delete(tag_id, owner_id)
            .map_err(|_| CoreError::TagNotFound(tag_id))?;

        let rewritten = self.notes.update_owned(owner_id, now_epoch_ms(), |note| {
            if note.has_tag(tag_id) {
                note.tag_ids.retain(|id| *id != tag_id);
                true
            } else {
                false
            }
        });
        info!(
            "event=tag_cascade module=service status=ok tag_id={} notes_rewritten={}",
            tag_id, rewritten
        );
        self.persist();
        Ok(())
    }

    // ── Maintenance ─────────────────────────────────────────────────

    /// Drops expired revocation entries; meant for a periodic timer.
    pub fn purge_expired_revocations(&mut self) -> usize {
        let purged = self.tokens.purge_expired(now_epoch_ms());
        if purged > 0 {
            self.persist();
        }
        purged
    }

    /// Snapshot write-through after a completed in-memory mutation.
    ///
    /// Failure is logged and swallowed: the mutation is already committed
    /// in memory and the operation reports success regardless.
    fn persist(&mut self) {
        let data = SnapshotData {
            users: self.credentials.records().to_vec(),
            notes: self.notes.rows().to_vec(),
            tags: self.tags.rows().to_vec(),
            revocations: self.tokens.revocations(),
        };
        if let Err(err) = self.gateway.save(&data) {
            warn!(
                "event=write_through module=service status=error error={err} \
                 note=in-memory state retained, snapshot is stale"
            );
        }
    }
}
