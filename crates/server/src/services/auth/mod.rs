//! Credential store: identity registration and password verification.
//!
//! Passwords are hashed with Argon2id using a per-identity random salt. The
//! stored PHC string embeds the algorithm parameters, so [`PasswordPolicy`]
//! can be retuned without invalidating existing hashes. Hashing and
//! verification run on the blocking thread pool.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use animart_core::{Email, Username};

use crate::db::{IdentityStore, RepositoryError};
use crate::models::{Identity, IdentityRef, NewIdentity};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length, in characters.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Argon2id cost parameters used for new hashes.
#[derive(Debug, Clone, Default)]
pub struct PasswordPolicy {
    params: Params,
}

impl PasswordPolicy {
    /// Build a policy from explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `argon2::Error` if the parameters are out of range (for example
    /// `memory_kib < 8 * parallelism`).
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        Ok(Self { params })
    }

    /// The configured parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }
}

/// Verify a password against a stored PHC hash.
///
/// The parameters come from the hash itself, not from the current policy.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Signup input. The password is only ever held as a secret.
#[derive(Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

/// Registers identities and verifies presented passwords.
#[derive(Clone)]
pub struct CredentialStore {
    identities: Arc<dyn IdentityStore>,
    policy: PasswordPolicy,
}

impl CredentialStore {
    /// Create a credential store over an identity store.
    #[must_use]
    pub fn new(identities: Arc<dyn IdentityStore>, policy: PasswordPolicy) -> Self {
        Self { identities, policy }
    }

    /// Register a new identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is malformed.
    /// Returns `AuthError::AlreadyExists` if the username is taken, including
    /// when a concurrent signup wins the race at the store.
    /// Returns `AuthError::StoreUnavailable` if the store cannot be reached.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Identity, AuthError> {
        let username = Username::parse(request.username.trim())?;
        let email = Email::parse(request.email.trim())?;
        validate_password(request.password.expose_secret())?;

        if self.identities.find_by_username(&username).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let policy = self.policy.clone();
        let password = request.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || policy.hash(password.expose_secret()))
                .await
                .map_err(|_| AuthError::PasswordHash)??;

        let identity = self
            .identities
            .insert(NewIdentity {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::from(other),
            })?;

        tracing::info!(user_id = %identity.id, "identity registered");
        Ok(identity)
    }

    /// Verify an email/password pair.
    ///
    /// When several identities share the email, the earliest registered one
    /// is checked.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if no identity has this email.
    /// Returns `AuthError::InvalidCredentials` if the password does not match.
    /// Returns `AuthError::StoreUnavailable` if the store cannot be reached.
    #[instrument(skip_all)]
    pub async fn verify(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityRef, AuthError> {
        // A malformed email cannot belong to any stored identity.
        let Ok(email) = Email::parse(email.trim()) else {
            return Err(AuthError::NotFound);
        };

        let identity = self
            .identities
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)?;

        let password = password.clone();
        let hash = identity.password_hash.clone();
        tokio::task::spawn_blocking(move || verify_password(password.expose_secret(), &hash))
            .await
            .map_err(|_| AuthError::PasswordHash)?
            .inspect_err(|_| tracing::debug!(user_id = %identity.id, "password mismatch"))?;

        Ok(identity.to_ref())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
