//! In-process test harness for the Animart HTTP API.
//!
//! Each [`TestApp`] owns its own [`MemoryStore`] and [`ManualClock`], so tests
//! run in parallel without a database and can move time forward to expire
//! session tokens.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p animart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use animart_core::{Email, Username};
use animart_server::db::{IdentityStore, MemoryStore, ProductStore, RepositoryError};
use animart_server::models::{Identity, NewIdentity, NewProduct, Product};
use animart_server::services::session::{Clock, DEFAULT_TOKEN_TTL_SECS, ManualClock};
use animart_server::services::{PasswordPolicy, SessionIssuer};
use animart_server::state::AppState;

/// Signing key used by default in tests.
pub const TEST_SECRET: &str = "Zq8#vN2!pL5@rT9$wX3^kM7&bC1*dF4%";

/// A second, unrelated signing key.
pub const OTHER_SECRET: &str = "Hk4^tW8@zQ1!mB6#pX3$vR9&cN5*jL2%";

/// Cheap Argon2id parameters so tests hash in microseconds.
#[must_use]
pub fn fast_policy() -> PasswordPolicy {
    PasswordPolicy::new(8, 1, 1).expect("valid argon2 parameters")
}

/// A fixed starting instant for the manual clock.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000, 0).expect("valid timestamp")
}

/// The application under test plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `msg` field of the body, if any.
    #[must_use]
    pub fn msg(&self) -> Option<&str> {
        self.body.get("msg").and_then(Value::as_str)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A fresh app with an empty store, signing with [`TEST_SECRET`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(MemoryStore::new(), TEST_SECRET, Arc::new(ManualClock::new(epoch())))
    }

    /// An app over an existing store, key and clock.
    #[must_use]
    pub fn with_parts(store: MemoryStore, secret: &str, clock: Arc<ManualClock>) -> Self {
        let sessions = SessionIssuer::with_clock(
            &SecretString::from(secret),
            TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            fast_policy(),
            sessions,
        );

        Self {
            router: animart_server::app(state),
            store,
            clock,
        }
    }

    /// An app whose stores always report `Unavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        let clock = Arc::new(ManualClock::new(epoch()));
        let sessions = SessionIssuer::with_clock(
            &SecretString::from(TEST_SECRET),
            TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        let state = AppState::new(
            Arc::new(UnavailableStore),
            Arc::new(UnavailableStore),
            fast_policy(),
            sessions,
        );

        Self {
            router: animart_server::app(state),
            store: MemoryStore::new(),
            clock,
        }
    }

    /// Send a request, optionally with a raw body and a bearer token.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
        bearer: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .body(body.map_or_else(Body::empty, Body::from))
            .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// POST a JSON value.
    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body.to_string()), None)
            .await
    }

    /// GET without credentials.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    /// GET with a bearer token.
    pub async fn get_with_token(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, None, Some(token)).await
    }

    /// Register an identity through the API.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/signup",
            &serde_json::json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    /// Sign in through the API.
    pub async fn signin(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/signin",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register then sign in, returning the session token.
    pub async fn token_for(&self, username: &str, email: &str, password: &str) -> String {
        let signup = self.signup(username, email, password).await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);

        let signin = self.signin(email, password).await;
        assert_eq!(signin.status, StatusCode::OK, "{:?}", signin.body);
        signin.body["token"]
            .as_str()
            .expect("token in signin response")
            .to_owned()
    }

    /// Add a product through the API.
    pub async fn add_product(&self, title: &str, price: f64, category: &str) -> TestResponse {
        self.post_json(
            "/products",
            &serde_json::json!({
                "title": title,
                "price": price,
                "img": format!("https://cdn.animart.example/{title}.png"),
                "category": category,
            }),
        )
        .await
    }
}

/// A store whose backend is always down.
struct UnavailableStore;

fn down() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_owned())
}

#[async_trait]
impl IdentityStore for UnavailableStore {
    async fn find_by_username(&self, _: &Username) -> Result<Option<Identity>, RepositoryError> {
        Err(down())
    }

    async fn find_by_email(&self, _: &Email) -> Result<Option<Identity>, RepositoryError> {
        Err(down())
    }

    async fn insert(&self, _: NewIdentity) -> Result<Identity, RepositoryError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(down())
    }
}

#[async_trait]
impl ProductStore for UnavailableStore {
    async fn insert(&self, _: NewProduct) -> Result<Product, RepositoryError> {
        Err(down())
    }

    async fn search(&self, _: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        Err(down())
    }
}
