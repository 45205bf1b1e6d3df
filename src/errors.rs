//! Application-wide error type.
//!
//! Module-level errors (`StoreError`, `IriError`, `AssertionError`) convert
//! into [`Error`] with `?`. The HTTP mapping lives in
//! [`crate::controller`].

use axum::http::StatusCode;

use crate::{
    ontology::{assertion::AssertionError, IriError},
    store::StoreError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("{1}")]
    CustomError(StatusCode, String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error(transparent)]
    Iri(#[from] IriError),

    #[error(transparent)]
    Axum(#[from] axum::http::Error),

    #[error(transparent)]
    Tera(#[from] tera::Error),

    #[error(transparent)]
    JSON(#[from] serde_json::Error),

    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Any(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Any(Box::new(err))
    }

    pub fn msg(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Message(err.to_string())
    }

    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::Message(s.to_string())
    }
}
