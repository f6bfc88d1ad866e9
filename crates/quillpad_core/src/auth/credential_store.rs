//! User account collection and authentication.
//!
//! # Responsibility
//! - Own the Users collection; enforce username uniqueness.
//! - Authenticate username/password pairs.
//!
//! # Invariants
//! - Username comparison is a case-sensitive exact match.
//! - `authenticate` reports one failure kind for "no such user" and "wrong
//!   password" alike, and burns a hash on the unknown-user path.
//! - `delete` removes only the account row; cascades over notes/tags are
//!   the service layer's responsibility.

use crate::auth::password::{self, HashingError};
use crate::model::now_epoch_ms;
use crate::model::user::{User, UserId, UserRecord};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

/// Account-layer failure kinds.
#[derive(Debug)]
pub enum AuthError {
    /// Username is empty or whitespace-only.
    InvalidUsername(String),
    /// Username already registered under a different account.
    DuplicateUsername(String),
    /// Unknown user or wrong password; intentionally indistinct.
    InvalidCredentials,
    /// No account row for the given id.
    NotFound(UserId),
    /// Internal hashing failure; surfaced generically by callers.
    Hashing(HashingError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(f, "invalid username: `{value}`"),
            Self::DuplicateUsername(value) => write!(f, "username already taken: `{value}`"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Hashing(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hashing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HashingError> for AuthError {
    fn from(value: HashingError) -> Self {
        Self::Hashing(value)
    }
}

/// Exclusive owner of the Users collection.
#[derive(Debug, Default)]
pub struct CredentialStore {
    users: Vec<UserRecord>,
}

impl CredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { users: Vec::new() }
    }

    /// Rebuilds the store from snapshot rows.
    pub fn from_records(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    /// Borrows all account rows for snapshot serialization.
    pub fn records(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Returns whether an account row exists for the id.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.iter().any(|row| row.id == user_id)
    }

    /// Looks up the sanitized view of one account.
    pub fn get(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .iter()
            .find(|row| row.id == user_id)
            .map(UserRecord::to_public)
            .ok_or(AuthError::NotFound(user_id))
    }

    /// Registers a new account under a unique username.
    pub fn register(&mut self, username: &str, plaintext: &str) -> AuthResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername(username.to_string()));
        }
        if self.username_taken(username, None) {
            warn!("event=user_register module=auth status=error error_code=duplicate_username");
            return Err(AuthError::DuplicateUsername(username.to_string()));
        }

        let digest = password::hash(plaintext)?;
        let record = UserRecord::new(username, digest.hash, digest.salt);
        let public = record.to_public();
        self.users.push(record);
        info!(
            "event=user_register module=auth status=ok user_id={}",
            public.id
        );
        Ok(public)
    }

    /// Authenticates a username/password pair.
    ///
    /// One failure kind for both miss cases, with a dummy hash on the
    /// unknown-user path to keep timing flat.
    pub fn authenticate(&self, username: &str, plaintext: &str) -> AuthResult<User> {
        let Some(record) = self.users.iter().find(|row| row.username == username.trim()) else {
            password::dummy_hash(plaintext);
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(plaintext, &record.password_hash, &record.salt) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(record.to_public())
    }

    /// Updates username and/or password of one account.
    ///
    /// A user may "update" to their own current username without error; a
    /// collision with a different account fails.
    pub fn update_profile(
        &mut self,
        user_id: UserId,
        new_username: Option<&str>,
        new_plaintext: Option<&str>,
    ) -> AuthResult<User> {
        if !self.contains(user_id) {
            return Err(AuthError::NotFound(user_id));
        }

        let normalized_username = match new_username {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(AuthError::InvalidUsername(trimmed.to_string()));
                }
                if self.username_taken(trimmed, Some(user_id)) {
                    return Err(AuthError::DuplicateUsername(trimmed.to_string()));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        // Hash before touching the row so a hashing failure mutates nothing.
        let new_digest = match new_plaintext {
            Some(plaintext) => Some(password::hash(plaintext)?),
            None => None,
        };

        let record = self
            .users
            .iter_mut()
            .find(|row| row.id == user_id)
            .ok_or(AuthError::NotFound(user_id))?;

        if let Some(username) = normalized_username {
            record.username = username;
        }
        if let Some(digest) = new_digest {
            record.password_hash = digest.hash;
            record.salt = digest.salt;
        }
        record.updated_at = now_epoch_ms();

        info!(
            "event=user_profile_update module=auth status=ok user_id={}",
            user_id
        );
        Ok(record.to_public())
    }

    /// Removes one account row. No cascade happens here.
    pub fn delete(&mut self, user_id: UserId) -> AuthResult<()> {
        let position = self
            .users
            .iter()
            .position(|row| row.id == user_id)
            .ok_or(AuthError::NotFound(user_id))?;
        self.users.remove(position);
        info!(
            "event=user_delete module=auth status=ok user_id={}",
            user_id
        );
        Ok(())
    }

    fn username_taken(&self, username: &str, exclude: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|row| row.username == username && Some(row.id) != exclude)
    }
}
