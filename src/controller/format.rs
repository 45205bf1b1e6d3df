//! Response builders used by the handlers.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{views::ViewRenderer, Result};

/// Returns a JSON response.
///
/// # Errors
/// Currently this function doesn't return any error; the `Result` keeps
/// handlers uniform.
pub fn json<T: Serialize>(t: T) -> Result<Response> {
    Ok(Json(t).into_response())
}

/// Returns an HTML response.
///
/// # Errors
/// Currently this function doesn't return any error.
pub fn html(content: &str) -> Result<Response> {
    Ok(Html(content.to_string()).into_response())
}

/// Renders `key` with `data` and returns it as HTML.
///
/// # Errors
/// When the view cannot be rendered.
pub fn render<V, S>(v: &V, key: &str, data: S) -> Result<Response>
where
    V: ViewRenderer,
    S: Serialize,
{
    html(&v.render(key, data)?)
}

/// `302 Found` pointing at `to`.
///
/// # Errors
/// When `to` is not a valid header value.
pub fn redirect_found(to: &str) -> Result<Response> {
    Ok(Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, to)
        .body(Body::empty())?)
}

/// Body with an explicit content type.
///
/// # Errors
/// When `content_type` is not a valid header value.
pub fn typed(content_type: &str, body: impl Into<Body>) -> Result<Response> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_uses_found() {
        let response = redirect_found("/?class_uri=x").expect("response");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).map(|v| v.as_bytes()),
            Some(b"/?class_uri=x".as_slice())
        );
    }
}
