#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

pub use self::errors::Error;

pub mod app;
pub mod boot;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controller;
pub mod environment;
pub mod errors;
pub mod logger;
pub mod ontology;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod tests_cfg;
pub mod views;

/// Application results, defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
