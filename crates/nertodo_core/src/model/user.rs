//! User and session model.
//!
//! # Responsibility
//! - Define the public user projection and stored credential record.
//! - Wrap session tokens in an opaque type.
//!
//! # Invariants
//! - `User` never carries the password digest.
//! - Session tokens are random and never derived from user data.
//! - Storage only sees [`SessionToken::digest`], never the token itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a user account.
pub type UserId = Uuid;

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Stored account row including the password digest.
///
/// Only the repository and account service see this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Opaque session token handed to clients after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps a token received from a client. Surrounding whitespace is dropped.
    pub fn from_client(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 of the token; the only form that is persisted.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    /// Unix epoch milliseconds after which the session is rejected.
    pub expires_at_ms: i64,
}
