//! Domain models for the shop backend.
//!
//! These types represent validated domain objects separate from database row
//! types and from HTTP request bodies.

pub mod product;
pub mod user;

pub use product::{NewProduct, Product};
pub use user::{Identity, IdentityRef, NewIdentity};
