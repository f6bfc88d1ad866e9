//! Signed bearer token issuing, verification and revocation.
//!
//! # Responsibility
//! - Issue time-bounded tokens bound to a user identity, signed with the
//!   process-wide secret.
//! - Verify tokens statelessly and keep the revocation set of
//!   revoked-but-unexpired tokens.
//!
//! # Invariants
//! - Verification order is fixed: signature, then expiry, then revocation
//!   membership. A tampered token never reveals whether it was revoked.
//! - Revocation decodes the expiry without re-verifying the signature, so
//!   a token about to expire legitimately can still be revoked.
//! - The revocation set holds no entry expired longer than one purge cycle.

use crate::auth::password::constant_time_eq;
use crate::model::now_epoch_ms;
use crate::model::user::{User, UserId};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default token lifetime: 24 hours (milliseconds).
pub const DEFAULT_TOKEN_TTL_MS: i64 = 24 * 60 * 60 * 1000;

pub type TokenResult<T> = Result<T, TokenError>;

/// Token-layer failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token structure or claims payload is not decodable.
    Malformed,
    /// Signature does not match the claims under the process secret.
    BadSignature,
    /// Token was valid but its expiry instant has passed.
    Expired,
    /// Token was explicitly revoked before its natural expiry.
    Revoked,
    /// Claims could not be encoded at issue time; internal failure.
    Encode(String),
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed token"),
            Self::BadSignature => write!(f, "token signature mismatch"),
            Self::Expired => write!(f, "token expired"),
            Self::Revoked => write!(f, "token revoked"),
            Self::Encode(details) => write!(f, "token encoding failed: {details}"),
        }
    }
}

impl Error for TokenError {}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub username: String,
    /// Unix epoch milliseconds.
    pub issued_at: i64,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
}

/// Claims payload embedded in the token body segment.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: UserId,
    username: String,
    issued_at: i64,
    expires_at: i64,
}

/// One remembered revoked-but-unexpired token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationEntry {
    pub token: String,
    /// Unix epoch milliseconds; entry is purgeable once this has passed.
    pub expires_at: i64,
}

/// Issues and verifies signed bearer tokens; owns the revocation set.
///
/// Token wire format: `base64url(claims_json) + "." + hex(sha256(secret ||
/// body))`. The token is opaque to callers; only this authority decodes it.
pub struct TokenAuthority {
    secret: Vec<u8>,
    ttl_ms: i64,
    revoked: HashMap<String, i64>,
}

impl TokenAuthority {
    /// Creates an authority with an empty revocation set.
    pub fn new(secret: impl Into<Vec<u8>>, ttl_ms: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_ms,
            revoked: HashMap::new(),
        }
    }

    /// Rebuilds the authority from snapshot revocation entries.
    pub fn with_revocations(
        secret: impl Into<Vec<u8>>,
        ttl_ms: i64,
        entries: Vec<RevocationEntry>,
    ) -> Self {
        let mut authority = Self::new(secret, ttl_ms);
        for entry in entries {
            authority.revoked.insert(entry.token, entry.expires_at);
        }
        authority
    }

    /// Serializes the revocation set for the snapshot, sorted for stable
    /// output.
    pub fn revocations(&self) -> Vec<RevocationEntry> {
        let mut entries: Vec<RevocationEntry> = self
            .revoked
            .iter()
            .map(|(token, expires_at)| RevocationEntry {
                token: token.clone(),
                expires_at: *expires_at,
            })
            .collect();
        entries.sort_by(|a, b| a.token.cmp(&b.token));
        entries
    }

    /// Issues a token for the given user, expiring after the configured TTL.
    pub fn issue(&self, user: &User) -> TokenResult<String> {
        self.issue_at(user, now_epoch_ms())
    }

    /// Issues a token with an explicit issue instant.
    pub fn issue_at(&self, user: &User, now_ms: i64) -> TokenResult<String> {
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            issued_at: now_ms,
            expires_at: now_ms + self.ttl_ms,
        };
        let payload =
            serde_json::to_vec(&claims).map_err(|err| TokenError::Encode(err.to_string()))?;
        let body = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(&body);
        debug!(
            "event=token_issue module=auth status=ok user_id={} expires_at={}",
            user.id, claims.expires_at
        );
        Ok(format!("{body}.{signature}"))
    }

    /// Verifies a token against the current wall clock.
    pub fn verify(&self, token: &str) -> TokenResult<TokenIdentity> {
        self.verify_at(token, now_epoch_ms())
    }

    /// Verifies a token at an explicit instant.
    ///
    /// Order is part of the contract: signature first, then expiry, then
    /// revocation membership.
    pub fn verify_at(&self, token: &str, now_ms: i64) -> TokenResult<TokenIdentity> {
        let (body, signature) = split_token(token)?;

        let expected = self.sign(body);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(TokenError::BadSignature);
        }

        let claims = decode_claims(body)?;
        if claims.expires_at <= now_ms {
            return Err(TokenError::Expired);
        }

        if self.revoked.contains_key(token) {
            return Err(TokenError::Revoked);
        }

        Ok(TokenIdentity {
            user_id: claims.user_id,
            username: claims.username,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        })
    }

    /// Adds a token to the revocation set.
    ///
    /// Only the expiry is decoded; the signature is deliberately not
    /// re-checked so revocation cannot race a token's natural expiry.
    pub fn revoke(&mut self, token: &str) -> TokenResult<()> {
        let (body, _) = split_token(token)?;
        let claims = decode_claims(body)?;
        self.revoked.insert(token.to_string(), claims.expires_at);
        info!(
            "event=token_revoke module=auth status=ok user_id={} expires_at={}",
            claims.user_id, claims.expires_at
        );
        Ok(())
    }

    /// Returns whether the exact token string is currently revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked.contains_key(token)
    }

    /// Drops every revocation entry whose expiry has passed.
    ///
    /// Driven externally on a timer; also safe to call before any verify.
    pub fn purge_expired(&mut self, now_ms: i64) -> usize {
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now_ms);
        let purged = before - self.revoked.len();
        if purged > 0 {
            info!(
                "event=revocation_purge module=auth status=ok purged={} remaining={}",
                purged,
                self.revoked.len()
            );
        }
        purged
    }

    pub fn revocation_count(&self) -> usize {
        self.revoked.len()
    }

    fn sign(&self, body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn split_token(token: &str) -> TokenResult<(&str, &str)> {
    token.split_once('.').ok_or(TokenError::Malformed)
}

fn decode_claims(body: &str) -> TokenResult<Claims> {
    let payload = URL_SAFE_NO_PAD
        .decode(body.as_bytes())
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)
}
