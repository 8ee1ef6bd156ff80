//! In-memory implementation of both persistence ports.
//!
//! Keeps the same contract as the `PostgreSQL` adapters, including atomic
//! username uniqueness: the existence check and the write happen under one
//! write lock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use animart_core::{Email, ProductId, UserId, Username};

use super::{IdentityStore, ProductStore, RepositoryError};
use crate::models::{Identity, NewIdentity, NewProduct, Product};

#[derive(Default)]
struct Tables {
    identities: Vec<Identity>,
    products: Vec<Product>,
    next_user_id: i64,
    next_product_id: i64,
}

/// Process-local store. Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities registered under `username`.
    pub async fn count_username(&self, username: &Username) -> usize {
        self.tables
            .read()
            .await
            .identities
            .iter()
            .filter(|i| &i.username == username)
            .count()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Identity>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .identities
            .iter()
            .find(|i| &i.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        // Identities are appended in id order, so the first hit is the lowest id.
        let tables = self.tables.read().await;
        Ok(tables.identities.iter().find(|i| &i.email == email).cloned())
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables
            .identities
            .iter()
            .any(|i| i.username == identity.username)
        {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        tables.next_user_id += 1;
        let created = Identity {
            id: UserId::new(tables.next_user_id),
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            created_at: Utc::now(),
        };
        tables.identities.push(created.clone());

        Ok(created)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.write().await;

        tables.next_product_id += 1;
        let created = Product {
            id: ProductId::new(tables.next_product_id),
            title: product.title,
            price: product.price,
            img: product.img,
            category: product.category,
        };
        tables.products.push(created.clone());

        Ok(created)
    }

    async fn search(&self, needle: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;

        let Some(needle) = needle else {
            return Ok(tables.products.clone());
        };

        let needle = needle.to_lowercase();
        Ok(tables
            .products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use animart_core::Price;

    use super::*;

    fn new_identity(username: &str, email: &str) -> NewIdentity {
        NewIdentity {
            username: Username::parse(username).unwrap(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
        }
    }

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            title: title.to_owned(),
            price: Price::from_f64(10.0).unwrap(),
            img: format!("/img/{title}.png"),
            category: "misc".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_username() {
        let store = MemoryStore::new();
        IdentityStore::insert(&store, new_identity("alice", "a@x.com"))
            .await
            .unwrap();

        let err = IdentityStore::insert(&store, new_identity("alice", "other@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        let username = Username::parse("alice").unwrap();
        assert_eq!(store.count_username(&username).await, 1);
    }

    #[tokio::test]
    async fn test_find_by_email_returns_lowest_id() {
        let store = MemoryStore::new();
        let first = IdentityStore::insert(&store, new_identity("first", "shared@x.com"))
            .await
            .unwrap();
        IdentityStore::insert(&store, new_identity("second", "shared@x.com"))
            .await
            .unwrap();

        let found = store
            .find_by_email(&Email::parse("shared@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        ProductStore::insert(&store, new_product("Naruto-Bag"))
            .await
            .unwrap();
        ProductStore::insert(&store, new_product("demon-cup"))
            .await
            .unwrap();

        let hits = store.search(Some("NARUTO")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Naruto-Bag");

        assert_eq!(store.search(None).await.unwrap().len(), 2);
        assert!(store.search(Some("zzz")).await.unwrap().is_empty());
    }
}
