//! Authentication error types.

use thiserror::Error;

use animart_core::{EmailError, UsernameError};

use crate::db::RepositoryError;

/// Errors that can occur during registration and password verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identity with this username already exists.
    #[error("user already exists")]
    AlreadyExists,

    /// No identity is registered with this email.
    #[error("user not found")]
    NotFound,

    /// The password does not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity store cannot be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Password hashing failed or the hashing task was lost.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(reason) => Self::StoreUnavailable(reason),
            other => Self::Repository(other),
        }
    }
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        Self::Validation(format!("invalid email: {err}"))
    }
}

impl From<UsernameError> for AuthError {
    fn from(err: UsernameError) -> Self {
        Self::Validation(format!("invalid username: {err}"))
    }
}
