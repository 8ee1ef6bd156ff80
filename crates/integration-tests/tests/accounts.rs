//! Signup and signin over HTTP.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tokio::task::JoinSet;

use animart_core::Username;
use animart_integration_tests::TestApp;

#[tokio::test]
async fn test_alice_signup_signin_and_wrong_password() {
    let app = TestApp::new();

    let signup = app.signup("alice", "a@x.com", "secret1").await;
    assert_eq!(signup.status, StatusCode::CREATED);
    assert_eq!(signup.body, json!({ "msg": "Registration successful" }));

    let signin = app.signin("a@x.com", "secret1").await;
    assert_eq!(signin.status, StatusCode::OK);
    assert_eq!(signin.msg(), Some("Login successful"));
    assert!(!signin.body["token"].as_str().unwrap().is_empty());

    let wrong = app.signin("a@x.com", "wrong").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, json!({ "msg": "Invalid email or password" }));
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = TestApp::new();
    app.signup("alice", "a@x.com", "secret1").await;

    let again = app.signup("alice", "other@x.com", "secret2").await;

    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.msg(), Some("User already exists"));
    let alice = Username::parse("alice").unwrap();
    assert_eq!(app.store.count_username(&alice).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_signups_create_one_identity() {
    let app = Arc::new(TestApp::new());

    let mut attempts = JoinSet::new();
    for i in 0..6 {
        let app = Arc::clone(&app);
        attempts.spawn(async move {
            app.signup("racer", &format!("racer{i}@x.com"), "secret1")
                .await
                .status
        });
    }
    let statuses = attempts.join_all().await;

    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1
    );
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT)
    );
    let racer = Username::parse("racer").unwrap();
    assert_eq!(app.store.count_username(&racer).await, 1);
}

#[tokio::test]
async fn test_unknown_email_is_not_found() {
    let app = TestApp::new();
    app.signup("alice", "a@x.com", "secret1").await;

    let response = app.signin("nobody@x.com", "secret1").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "msg": "User not found" }));
}

#[tokio::test]
async fn test_wrong_passwords_are_always_invalid_credentials() {
    let app = TestApp::new();
    app.signup("alice", "a@x.com", "secret1").await;

    for wrong in ["", "secret", "secret12", "Secret1", " secret1"] {
        let response = app.signin("a@x.com", wrong).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{wrong:?}");
        assert_eq!(response.msg(), Some("Invalid email or password"));
    }
}

#[tokio::test]
async fn test_signin_uses_earliest_identity_for_shared_email() {
    let app = TestApp::new();
    app.signup("alice", "shared@x.com", "secret1").await;
    app.signup("alicia", "shared@x.com", "other-pass").await;

    assert_eq!(
        app.signin("shared@x.com", "secret1").await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.signin("shared@x.com", "other-pass").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_signup_validation_errors_are_bad_request() {
    let app = TestApp::new();

    let cases = [
        json!({ "username": "al", "email": "a@x.com", "password": "secret1" }),
        json!({ "username": "alice", "email": "nope", "password": "secret1" }),
        json!({ "username": "alice", "email": "a@x.com", "password": "12345" }),
        json!({ "username": "al ice", "email": "a@x.com", "password": "secret1" }),
        json!({ "username": "alice", "email": "a@x.com" }),
    ];
    for body in &cases {
        let response = app.post_json("/signup", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response.msg().is_some_and(|m| !m.is_empty()), "{body}");
    }

    let alice = Username::parse("alice").unwrap();
    assert_eq!(app.store.count_username(&alice).await, 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/signin", Some("{not json".to_owned()), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.msg().is_some());
}

#[tokio::test]
async fn test_password_never_echoed() {
    let app = TestApp::new();

    let signup = app.signup("alice", "a@x.com", "hunter22").await;
    let signin = app.signin("a@x.com", "hunter22").await;

    assert!(!signup.body.to_string().contains("hunter22"));
    assert!(!signin.body.to_string().contains("hunter22"));
}
