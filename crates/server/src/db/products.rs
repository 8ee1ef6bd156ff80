//! `PostgreSQL` product store.

use async_trait::async_trait;
use sqlx::PgPool;

use animart_core::{Price, ProductId};

use super::{ProductStore, RepositoryError, map_sqlx_error};
use crate::models::{NewProduct, Product};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    price: Price,
    img: String,
    category: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            price: row.price,
            img: row.img,
            category: row.category,
        }
    }
}

/// Product store backed by the `products` table.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (title, price, img, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, price, img, category
            ",
        )
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.img)
        .bind(&product.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "product already exists"))?;

        Ok(row.into())
    }

    async fn search(&self, needle: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let query = match needle {
            Some(needle) => sqlx::query_as::<_, ProductRow>(
                r"
                SELECT id, title, price, img, category
                FROM products
                WHERE title ILIKE '%' || $1 || '%' ESCAPE '\'
                ORDER BY id ASC
                ",
            )
            .bind(escape_like(needle)),
            None => sqlx::query_as::<_, ProductRow>(
                r"
                SELECT id, title, price, img, category
                FROM products
                ORDER BY id ASC
                ",
            ),
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "unexpected conflict"))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("naruto"), "naruto");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
