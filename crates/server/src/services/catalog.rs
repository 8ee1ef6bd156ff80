//! Product catalog: add and search.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use animart_core::{Price, PriceError};

use crate::db::{ProductStore, RepositoryError};
use crate::models::{NewProduct, Product};

/// Maximum length of any product text field.
const MAX_FIELD_LENGTH: usize = 512;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The product store cannot be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(reason) => Self::StoreUnavailable(reason),
            other => Self::Repository(other),
        }
    }
}

impl From<PriceError> for CatalogError {
    fn from(err: PriceError) -> Self {
        Self::Validation(format!("invalid price: {err}"))
    }
}

/// Unvalidated product input, as received from a client or seed file.
#[derive(Debug, Clone)]
pub struct NewProductRequest {
    pub title: String,
    pub price: f64,
    pub img: String,
    pub category: String,
}

/// Catalog service over a product store.
#[derive(Clone)]
pub struct Catalog {
    products: Arc<dyn ProductStore>,
}

impl Catalog {
    /// Create a catalog over a product store.
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    /// Validate and add a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if a text field is blank or too long,
    /// or the price is negative or not a finite number.
    #[instrument(skip_all, fields(title = %request.title))]
    pub async fn add(&self, request: &NewProductRequest) -> Result<Product, CatalogError> {
        let product = NewProduct {
            title: required_field("title", &request.title)?,
            price: Price::from_f64(request.price)?,
            img: required_field("img", &request.img)?,
            category: required_field("category", &request.category)?,
        };

        let product = self.products.insert(product).await?;
        tracing::info!(product_id = %product.id, "product added");
        Ok(product)
    }

    /// List products whose title contains `search`, ignoring case.
    ///
    /// A missing or blank search term lists the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::StoreUnavailable` if the store cannot be reached.
    #[instrument(skip(self))]
    pub async fn search(&self, search: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        let needle = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.products.search(needle).await?)
    }
}

fn required_field(name: &str, value: &str) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::Validation(format!("{name} is required")));
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(CatalogError::Validation(format!(
            "{name} must be at most {MAX_FIELD_LENGTH} characters"
        )));
    }
    Ok(value.to_owned())
}
