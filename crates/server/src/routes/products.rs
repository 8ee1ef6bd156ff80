//! Catalog handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiJson, ApiQuery};
use crate::error::Result;
use crate::models::Product;
use crate::services::NewProductRequest;
use crate::state::AppState;

/// Product creation body.
#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    pub title: String,
    pub price: f64,
    pub img: String,
    pub category: String,
}

/// Query parameters for product listing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Product creation response.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub msg: &'static str,
    pub product: Product,
}

/// Product listing response. `msg` is only present when nothing matched.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<&'static str>,
    pub products: Vec<Product>,
}

/// Add a product to the catalog.
#[instrument(skip_all, fields(title = %body.title))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateProductBody>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let request = NewProductRequest {
        title: body.title,
        price: body.price,
        img: body.img,
        category: body.category,
    };
    let product = state.catalog().add(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            msg: "Product added successfully",
            product,
        }),
    ))
}

/// List products, filtered by a case-insensitive title substring.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<ListResponse>> {
    let products = state.catalog().search(params.search.as_deref()).await?;

    let msg = products.is_empty().then_some("Not Found");
    Ok(Json(ListResponse { msg, products }))
}
