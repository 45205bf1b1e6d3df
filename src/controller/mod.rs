//! HTTP surface of the application.
//!
//! Each controller module exposes a `routes()` function returning a
//! [`Routes`] group; [`AppRoutes::application`] gathers them into the
//! router served by [`crate::boot`].
//!
//! Handlers return [`crate::Result<Response>`]. Errors are converted by the
//! [`IntoResponse`] implementation below into a JSON body of the shape
//! `{"error": ..., "description": ...}` and logged.

pub use app_routes::{AppRoutes, ListRoutes};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
pub use routes::Routes;
use serde::Serialize;

use crate::errors::Error;

mod app_routes;
pub mod flash;
pub mod form;
pub mod format;
pub mod monitoring;
mod routes;
pub mod schema;
pub mod triples;

/// Error body returned to API clients.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorDetail {
    #[must_use]
    pub fn new<T: Into<String>>(error: T, description: T) -> Self {
        Self {
            error: Some(error.into()),
            description: Some(description.into()),
        }
    }

    #[must_use]
    pub fn with_reason<T: Into<String>>(error: T) -> Self {
        Self {
            error: Some(error.into()),
            description: None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound | Self::BadRequest(_) => {
                tracing::debug!(error.msg = %self, "controller_error");
            }
            Self::Assertion(err) if err.is_validation() => {
                tracing::debug!(error.msg = %self, "controller_error");
            }
            _ => tracing::error!(error.msg = %self, error.details = ?self, "controller_error"),
        }

        let (status, detail) = match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("not_found", "Resource was not found"),
            ),
            Self::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("Bad Request".to_string(), reason),
            ),
            Self::Assertion(err) if err.is_validation() => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("invalid_triple".to_string(), err.to_string()),
            ),
            Self::CustomError(status, reason) => {
                let error = status.canonical_reason().unwrap_or("error").to_string();
                (status, ErrorDetail::new(error, reason))
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("internal_server_error", "Internal Server Error"),
            ),
        };

        (status, axum::Json(detail)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    async fn body_of(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        let (status, body) = body_of(Error::Store(StoreError::Poisoned)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_server_error");
        assert_eq!(body["description"], "Internal Server Error");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = body_of(Error::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
