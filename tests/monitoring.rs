mod support;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::get,
};
use axum_extra::extract::SignedCookieJar;
use ontoform::{
    controller::{flash, monitoring},
    ontology::Triple,
    store::{GraphStore, StoreError, TriplePattern},
    tests_cfg,
};
use serde_json::Value;
use support::{ex, flash_cookie, location, post_form};
use tower::ServiceExt;

/// Store whose every operation fails.
struct UnreachableStore;

#[async_trait]
impl GraphStore for UnreachableStore {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }

    async fn insert_all(&self, _triples: &[Triple]) -> Result<usize, StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn matching(&self, _pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

async fn call(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .method("GET")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let res_json: Value = serde_json::from_slice(&body).expect("Valid JSON response");
    (status, res_json)
}

#[tokio::test]
async fn ping_works() {
    let ctx = tests_cfg::app::get_app_context().await;

    let router = axum::Router::new()
        .route("/_ping", get(monitoring::ping))
        .with_state(ctx);

    let (status, res_json) = call(router, "/_ping").await;
    assert_eq!(status, 200);
    assert_eq!(res_json["ok"], true);
}

#[tokio::test]
async fn health_works() {
    let ctx = tests_cfg::app::get_app_context().await;

    let router = axum::Router::new()
        .route("/_health", get(monitoring::health))
        .with_state(ctx);

    let (status, res_json) = call(router, "/_health").await;
    assert_eq!(status, 200);
    assert_eq!(res_json["ok"], true);
}

#[tokio::test]
async fn readiness_with_db_success() {
    let ctx = tests_cfg::app::get_sqlite_app_context().await;

    let router = axum::Router::new()
        .route("/_readiness", get(monitoring::readiness))
        .with_state(ctx);

    let (status, res_json) = call(router, "/_readiness").await;
    assert_eq!(status, 200);
    assert_eq!(res_json["ok"], true);
}

#[tokio::test]
async fn readiness_with_store_failure() {
    let mut ctx = tests_cfg::app::get_app_context().await;
    ctx.store = Arc::new(UnreachableStore);

    let router = axum::Router::new()
        .route("/_readiness", get(monitoring::readiness))
        .with_state(ctx);

    let (status, res_json) = call(router, "/_readiness").await;
    assert_eq!(status, 200);
    assert_eq!(res_json["ok"], false);
}

#[tokio::test]
async fn api_reports_store_failures_as_500() {
    let mut ctx = tests_cfg::app::get_app_context().await;
    ctx.store = Arc::new(UnreachableStore);
    let router = ontoform::boot::create_router(ctx).expect("router");

    let (status, res_json) = call(router, "/api/classes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res_json["error"], "internal_server_error");
}

#[tokio::test]
async fn add_triple_reports_store_failures_generically() {
    let mut ctx = tests_cfg::app::get_app_context().await;
    ctx.store = Arc::new(UnreachableStore);
    let key = ctx.cookie_key.clone();
    let router = ontoform::boot::create_router(ctx).expect("router");

    let person = ex("Person");
    let has_name = ex("hasName");
    let response = post_form(
        &router,
        "/add_triple",
        &[
            ("subjectName", "Eve"),
            ("subjectClass", person.as_str()),
            ("property", has_name.as_str()),
            ("objectKind", "literal"),
            ("objectValueLiteral", "Eve"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/?class_uri="));

    // the form page needs the store too, so the message is read from the jar
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        flash_cookie(&response).parse().expect("cookie header"),
    );
    let (_, messages) = flash::take(SignedCookieJar::from_headers(&headers, key));
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, flash::FlashLevel::Error);
    assert!(messages[0].message.contains("could not be saved"));
}
