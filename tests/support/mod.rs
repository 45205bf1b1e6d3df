#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use ontoform::{app::AppContext, boot, tests_cfg};
use serde_json::Value;
use tower::ServiceExt;

pub const EX: &str = "https://example.org/kg/";
/// Namespace subjects created through the form are minted into.
pub const DATA: &str = "https://example.org/kg/data/";

#[derive(Clone, Copy, Debug)]
pub enum Backend {
    Memory,
    Sqlite,
}

pub async fn context(backend: Backend) -> AppContext {
    match backend {
        Backend::Memory => tests_cfg::app::get_app_context().await,
        Backend::Sqlite => tests_cfg::app::get_sqlite_app_context().await,
    }
}

pub fn ex(local: &str) -> String {
    format!("{EX}{local}")
}

pub fn data(local: &str) -> String {
    format!("{DATA}{local}")
}

pub fn router(ctx: AppContext) -> Router {
    boot::create_router(ctx).expect("router")
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.expect("response")
}

pub async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri).method("GET");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    send(router, request.body(Body::empty()).expect("request")).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn get_json(router: &Router, uri: &str) -> Value {
    let response = get(router, uri, None).await;
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    serde_json::from_str(&body_text(response).await).expect("Valid JSON response")
}

pub async fn post_form(router: &Router, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = serde_urlencoded::to_string(fields).expect("encoded form");
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request");
    send(router, request).await
}

/// `name=value` of the flash cookie set by `response`.
pub fn flash_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("_flash="))
        .and_then(|value| value.split(';').next())
        .expect("flash cookie")
        .to_string()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_string()
}

pub fn uris(json: &Value) -> Vec<String> {
    json.as_array()
        .expect("array")
        .iter()
        .map(|item| item["uri"].as_str().expect("uri").to_string())
        .collect()
}

/// Whether `page` renders a flash message of the given level.
pub fn shows_flash(page: &str, level: &str) -> bool {
    page.contains(&format!(r#"<div class="flash flash-{level}""#))
}
