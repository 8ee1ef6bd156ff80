//! Persistence ports and their adapters.
//!
//! The services never talk to a database directly; they consume the
//! [`IdentityStore`] and [`ProductStore`] ports. Two adapters exist:
//!
//! - [`users::PgIdentityStore`] / [`products::PgProductStore`] - `PostgreSQL`
//! - [`memory::MemoryStore`] - in-process, used by tests and local demos
//!
//! # Tables
//!
//! - `users` - Registered identities (UNIQUE index on `username`)
//! - `products` - Catalog entries
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p animart-cli -- migrate
//! ```

pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use animart_core::{Email, Username};

use crate::models::{Identity, NewIdentity, NewProduct, Product};

pub use memory::MemoryStore;
pub use products::PgProductStore;
pub use users::PgIdentityStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store cannot be reached right now (pool exhausted, connection lost).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for registered identities.
///
/// Implementations MUST reject a second identity with the same username with
/// [`RepositoryError::Conflict`], atomically with the write. Callers check for
/// an existing username first, but that check alone does not hold under
/// concurrent signups.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch an identity by its username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Identity>, RepositoryError>;

    /// Fetch the first identity (lowest id) registered with this email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError>;

    /// Persist a new identity.
    async fn insert(&self, identity: NewIdentity) -> Result<Identity, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Storage for catalog products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new product.
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// List products ordered by id, optionally keeping only those whose title
    /// contains `needle` (case-insensitive, literal match).
    async fn search(&self, needle: Option<&str>) -> Result<Vec<Product>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Classify a sqlx error into the repository taxonomy.
///
/// Unique violations become `Conflict(conflict)`; connectivity failures become
/// `Unavailable` so the HTTP layer can answer 503 instead of 500. A stored
/// value that no longer passes validation is `DataCorruption`.
pub(crate) fn map_sqlx_error(err: sqlx::Error, conflict: &str) -> RepositoryError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(conflict.to_owned())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => RepositoryError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { index, source } => {
            RepositoryError::DataCorruption(format!("column {index}: {source}"))
        }
        other => RepositoryError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut, "dup"),
            RepositoryError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed, "dup"),
            RepositoryError::Unavailable(_)
        ));
    }

    #[test]
    fn test_invalid_stored_values_are_corruption() {
        let err = sqlx::Error::ColumnDecode {
            index: "\"email\"".to_owned(),
            source: Box::new(animart_core::EmailError::AtSymbol),
        };

        match map_sqlx_error(err, "dup") {
            RepositoryError::DataCorruption(msg) => {
                assert_eq!(msg, "column \"email\": email must contain exactly one @ symbol");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_stay_database() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound, "dup"),
            RepositoryError::Database(_)
        ));
    }
}
