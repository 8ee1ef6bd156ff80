//! `PostgreSQL` identity store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use animart_core::{Email, UserId, Username};

use super::{IdentityStore, RepositoryError, map_sqlx_error};
use crate::models::{Identity, NewIdentity};

/// A `users` row. The newtypes re-validate on decode.
#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: UserId,
    username: Username,
    email: Email,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// Identity store backed by the `users` table.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    /// Create a new identity store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "username already exists"))?;

        Ok(row.map(Identity::from))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "username already exists"))?;

        Ok(row.map(Identity::from))
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            ",
        )
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "username already exists"))?;

        Ok(row.into())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error(e, "unexpected conflict"))
    }
}
