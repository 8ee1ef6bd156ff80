//! Health checks, middleware and store outages.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode, header};
use tower::ServiceExt;

use animart_integration_tests::TestApp;

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let app = TestApp::unavailable();

    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );

    let signup = app.signup("alice", "a@x.com", "secret1").await;
    assert_eq!(signup.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(signup.msg(), Some("Service temporarily unavailable"));

    let signin = app.signin("a@x.com", "secret1").await;
    assert_eq!(signin.status, StatusCode::SERVICE_UNAVAILABLE);

    let products = app.get("/products").await;
    assert_eq!(products.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();

    let response = app.get("/products").await;

    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = TestApp::new();

    let response = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    // Permissive CORS answers preflights for any origin
    let preflight = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::OPTIONS)
                .uri("/signin")
                .header(header::ORIGIN, "https://shop.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        preflight.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/admin").await.status, StatusCode::NOT_FOUND);
}
