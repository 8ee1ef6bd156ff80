//! Session issuer: stateless, signed, time-bounded tokens.
//!
//! Tokens are HS256 JWTs carrying `{id, email, iat, exp}`. Nothing is stored
//! server-side, so a token stays valid until its window closes even if the
//! identity's password changes or the signing key leaks; rotating the key
//! invalidates every outstanding token at once.
//!
//! The window closes at `iat` plus the issuer's *current* validity window, or
//! at the signed `exp` if that comes first. `iat` is truncated to whole
//! seconds at issuance, so a token never lives longer than the window.
//!
//! Expiry is checked against an injected [`Clock`] rather than the library's
//! built-in system-time check, so tests can move time forward.

mod clock;
mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use animart_core::{Email, UserId};

use crate::models::IdentityRef;

/// Default validity window of an issued token, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// The signed payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity the token was issued to.
    pub id: UserId,
    /// Email of that identity at issuance.
    pub email: Email,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch (`iat` + validity window).
    pub exp: i64,
}

impl SessionClaims {
    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Issues and validates session tokens with a single symmetric key.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    /// Create an issuer using wall-clock time.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: TimeDelta) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Create an issuer with an explicit time source.
    #[must_use]
    pub fn with_clock(secret: &SecretString, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl,
            clock,
        }
    }

    /// Sign a token asserting `identity`, valid for the configured window.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signing` if the token cannot be encoded.
    pub fn issue(&self, identity: &IdentityRef) -> Result<String, SessionError> {
        let issued_at = self.clock.now().timestamp();
        let claims = SessionClaims {
            id: identity.id,
            email: identity.email.clone(),
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Signing)
    }

    /// Check a token's signature and validity window.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Invalid` if the token is malformed, was signed
    /// with another key, or was altered.
    /// Returns `SessionError::Expired` if the current time is past `iat` plus
    /// the configured window, or past `exp`.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_owned()]);

        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|_| SessionError::Invalid)?
            .claims;

        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(SessionError::Invalid)?;
        let window_end = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(SessionError::Invalid)?;
        if self.clock.now() > window_end.min(claims.expires_at()) {
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }
}
