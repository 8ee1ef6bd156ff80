//! Catalog product types.

use serde::Serialize;

use animart_core::{Price, ProductId};

/// A catalog entry as returned by `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image reference (URL or asset path), stored verbatim.
    pub img: String,
    pub category: String,
}

/// A validated product ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub price: Price,
    pub img: String,
    pub category: String,
}
