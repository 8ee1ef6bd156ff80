//! Identity domain types.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use animart_core::{Email, UserId, Username};

/// A registered account (domain type).
///
/// Only the one-way password hash is held; `Debug` redacts it anyway so an
/// identity can be logged freely.
#[derive(Clone)]
pub struct Identity {
    /// Unique identity ID.
    pub id: UserId,
    /// Unique account handle.
    pub username: Username,
    /// Contact email, also the signin lookup key. Not unique.
    pub email: Email,
    /// PHC-formatted Argon2id hash, parameters included.
    pub password_hash: String,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// The reference handed to the session issuer after verification.
    #[must_use]
    pub fn to_ref(&self) -> IdentityRef {
        IdentityRef {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A verified identity: what a session token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRef {
    pub id: UserId,
    pub email: Email,
}

/// An identity ready to be persisted.
#[derive(Clone)]
pub struct NewIdentity {
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
}

impl fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewIdentity")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
