//! Credential and session lifecycle.
//!
//! # Responsibility
//! - One-way password hashing and verification.
//! - User account ownership (registration, authentication, profile).
//! - Signed bearer token issuing, verification and revocation.
//!
//! # Invariants
//! - Credential material (hash, salt, signing secret) never crosses this
//!   module boundary in a return value.
//! - Authentication failures are indistinguishable between unknown user and
//!   wrong password.

pub mod credential_store;
pub mod password;
pub mod token;

pub use credential_store::{AuthError, CredentialStore};
pub use password::{HashingError, PasswordDigest};
pub use token::{RevocationEntry, TokenAuthority, TokenError, TokenIdentity};
