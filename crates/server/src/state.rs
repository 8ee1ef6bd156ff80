//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{IdentityStore, PgIdentityStore, PgProductStore, ProductStore};
use crate::services::{Catalog, CredentialStore, PasswordPolicy, SessionIssuer};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Every collaborator is passed
/// in at construction; nothing is read from process-global state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    identities: Arc<dyn IdentityStore>,
    credentials: CredentialStore,
    sessions: SessionIssuer,
    catalog: Catalog,
}

impl AppState {
    /// Create application state over explicit stores.
    ///
    /// # Arguments
    ///
    /// * `identities` - Identity store used for registration, signin and readiness
    /// * `products` - Product store backing the catalog
    /// * `policy` - Argon2id parameters for new password hashes
    /// * `sessions` - Session token issuer
    #[must_use]
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        products: Arc<dyn ProductStore>,
        policy: PasswordPolicy,
        sessions: SessionIssuer,
    ) -> Self {
        let credentials = CredentialStore::new(Arc::clone(&identities), policy);
        let catalog = Catalog::new(products);

        Self {
            inner: Arc::new(AppStateInner {
                identities,
                credentials,
                sessions,
                catalog,
            }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn with_postgres(config: &ServerConfig, pool: PgPool) -> Self {
        let sessions = SessionIssuer::new(&config.token_secret, config.token_ttl);
        Self::new(
            Arc::new(PgIdentityStore::new(pool.clone())),
            Arc::new(PgProductStore::new(pool)),
            config.password_policy.clone(),
            sessions,
        )
    }

    /// Get a reference to the identity store.
    #[must_use]
    pub fn identities(&self) -> &dyn IdentityStore {
        self.inner.identities.as_ref()
    }

    /// Get a reference to the credential store.
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// Get a reference to the session issuer.
    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.inner.sessions
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
