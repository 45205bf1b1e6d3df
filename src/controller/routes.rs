use axum::routing::MethodRouter;

use crate::app::AppContext;

/// A group of handlers sharing an optional path prefix.
#[derive(Clone, Default, Debug)]
pub struct Routes {
    pub prefix: Option<String>,
    pub handlers: Vec<Handler>,
}

#[derive(Clone, Default, Debug)]
pub struct Handler {
    pub uri: String,
    pub method: MethodRouter<AppContext>,
}

impl Routes {
    /// Creates a new [`Routes`] instance with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`Routes`] instance with the given prefix.
    #[must_use]
    pub fn at(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    /// Adds a handler for `uri`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum::routing::get;
    /// use ontoform::controller::{format, Routes};
    ///
    /// async fn ping() -> ontoform::Result<axum::response::Response> {
    ///     format::json(())
    /// }
    /// Routes::new().add("/_ping", get(ping));
    /// ```
    #[must_use]
    pub fn add(mut self, uri: &str, method: MethodRouter<AppContext>) -> Self {
        self.handlers.push(Handler {
            uri: uri.to_owned(),
            method,
        });
        self
    }

    /// Sets the prefix for the routes.
    #[must_use]
    pub fn prefix(mut self, uri: &str) -> Self {
        self.prefix = Some(uri.to_owned());
        self
    }

    /// Appends the handlers of `other`, keeping this group's prefix.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        let other_prefix = other.prefix.unwrap_or_default();
        self.handlers
            .extend(other.handlers.into_iter().map(|handler| Handler {
                uri: format!("{other_prefix}{}", handler.uri),
                method: handler.method,
            }));
        self
    }
}
