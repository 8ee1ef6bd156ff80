//! Session token error types.

use thiserror::Error;

/// Errors that can occur while issuing or validating session tokens.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Signature does not verify, the token is malformed, or claims are missing.
    #[error("invalid session token")]
    Invalid,

    /// The token verified but its validity window has passed.
    #[error("session token expired")]
    Expired,

    /// Encoding the token failed.
    #[error("token signing error: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
