//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Accounts
//! POST /signup                 - Register {username, email, password}
//! POST /signin                 - Sign in {email, password}, returns a token
//! GET  /session                - Claims of the bearer token (requires auth)
//!
//! # Catalog
//! POST /products               - Add a product
//! GET  /products?search=...    - List products, optionally filtered by title
//! ```
//!
//! Every response body is JSON with a `msg` field on failure.

pub mod auth;
pub mod health;
pub mod products;
pub mod session;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the `{msg}` error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the `{msg}` error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the full route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/session", get(session::show))
        .route("/products", get(products::index).post(products::create))
}
