//! Business logic services.
//!
//! # Services
//!
//! - [`auth`] - Credential store (registration, password verification)
//! - [`session`] - Session issuer (signed, expiring tokens)
//! - [`catalog`] - Product catalog (add, search)
//!
//! Each service receives its collaborators through its constructor; there
//! is no process-global state.

pub mod auth;
pub mod catalog;
pub mod session;

pub use auth::{AuthError, CredentialStore, PasswordPolicy, RegisterRequest};
pub use catalog::{Catalog, CatalogError, NewProductRequest};
pub use session::{SessionClaims, SessionError, SessionIssuer};
