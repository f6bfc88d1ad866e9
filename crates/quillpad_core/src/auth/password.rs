//! Salted one-way password hashing.
//!
//! # Responsibility
//! - Derive and verify stretched password digests.
//!
//! # Invariants
//! - Hashing is deterministic for a given (plaintext, salt) pair.
//! - Verification is constant-time over the digest and never errors on a
//!   mismatch; it only reports `false`.
//! - Plaintext is never stored or logged.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Salt byte length before hex encoding.
const SALT_BYTES: usize = 16;

/// Number of SHA-256 iterations for key stretching.
const HASH_ITERATIONS: u32 = 100_000;

/// Fixed salt fed to [`dummy_hash`] so the unknown-user path costs the same
/// as a real verification.
const DUMMY_SALT: &str = "0000000000000000";

/// Internal hashing failure (entropy source exhaustion and the like).
///
/// Treated as an internal error by callers; the message is safe to log.
#[derive(Debug)]
pub struct HashingError(String);

impl Display for HashingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "password hashing failed: {}", self.0)
    }
}

impl Error for HashingError {}

/// Salted digest pair as stored on the account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    /// Hex-encoded stretched hash.
    pub hash: String,
    /// Hex-encoded per-user salt.
    pub salt: String,
}

/// Hashes a plaintext password under a fresh random salt.
pub fn hash(plaintext: &str) -> Result<PasswordDigest, HashingError> {
    let salt = generate_salt()?;
    let hash = derive(plaintext, &salt);
    Ok(PasswordDigest { hash, salt })
}

/// Verifies a plaintext attempt against a stored digest.
///
/// Mismatch is an expected outcome, not an error.
pub fn verify(plaintext: &str, stored_hash: &str, salt: &str) -> bool {
    let attempt = derive(plaintext, salt);
    constant_time_eq(attempt.as_bytes(), stored_hash.as_bytes())
}

/// Burns one full derivation against a fixed salt.
///
/// Called on the unknown-user path so authentication timing does not reveal
/// whether the username exists.
pub fn dummy_hash(plaintext: &str) {
    let _ = derive(plaintext, DUMMY_SALT);
}

/// Iterated salted SHA-256 derivation, deterministic per (plaintext, salt).
fn derive(plaintext: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plaintext.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..HASH_ITERATIONS {
        let mut round = Sha256::new();
        round.update(digest);
        round.update(salt.as_bytes());
        digest = round.finalize();
    }

    hex::encode(digest)
}

fn generate_salt() -> Result<String, HashingError> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| HashingError(err.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Constant-time byte comparison.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
