//! Collects every controller's [`Routes`] into one axum router and wraps it
//! in the HTTP middleware stack.

use std::time::Duration;

use axum::{extract::Request, Router as AXRouter};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{form, monitoring, routes::Routes, schema, triples};
use crate::{app::AppContext, Result};

#[derive(Clone, Debug)]
pub struct ListRoutes {
    pub uri: String,
}

impl std::fmt::Display for ListRoutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppRoutes {
    prefix: Option<String>,
    routes: Vec<Routes>,
}

impl AppRoutes {
    /// Monitoring routes only.
    #[must_use]
    pub fn with_default_routes() -> Self {
        Self::empty().add_route(monitoring::routes())
    }

    /// Every route served by the application.
    #[must_use]
    pub fn application() -> Self {
        Self::with_default_routes()
            .add_route(form::routes())
            .add_route(schema::routes())
            .add_route(triples::routes())
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    #[must_use]
    pub fn add_route(mut self, routes: Routes) -> Self {
        self.routes.push(routes);
        self
    }

    #[must_use]
    pub fn add_routes(mut self, routes: Vec<Routes>) -> Self {
        self.routes.extend(routes);
        self
    }

    fn full_uri(&self, routes: &Routes, uri: &str) -> String {
        let mut full = String::new();
        for part in [self.prefix.as_deref(), routes.prefix.as_deref()]
            .into_iter()
            .flatten()
        {
            full.push_str(part.trim_end_matches('/'));
        }
        if !uri.starts_with('/') {
            full.push('/');
        }
        full.push_str(uri);
        full
    }

    /// Lists the registered URIs, sorted.
    #[must_use]
    pub fn collect(&self) -> Vec<ListRoutes> {
        let mut list: Vec<ListRoutes> = self
            .routes
            .iter()
            .flat_map(|routes| {
                routes.handlers.iter().map(|handler| ListRoutes {
                    uri: self.full_uri(routes, &handler.uri),
                })
            })
            .collect();
        list.sort_by(|a, b| a.uri.cmp(&b.uri));
        list
    }

    /// Builds the router, with tracing, panic recovery and the optional
    /// request timeout applied.
    ///
    /// # Errors
    /// Fails when two groups register the same URI.
    pub fn to_router(&self, ctx: AppContext) -> Result<AXRouter> {
        let mut app = AXRouter::new();
        let mut seen = std::collections::HashSet::new();
        for routes in &self.routes {
            for handler in &routes.handlers {
                let uri = self.full_uri(routes, &handler.uri);
                if !seen.insert(uri.clone()) {
                    return Err(crate::Error::Message(format!("route `{uri}` registered twice")));
                }
                tracing::debug!(uri = %uri, "registering route");
                app = app.route(&uri, handler.method.clone());
            }
        }

        let mut app = app
            .layer(CatchPanicLayer::new())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http-request",
                        http.method = %request.method(),
                        http.uri = %request.uri(),
                        http.version = ?request.version(),
                    )
                }),
            );
        if let Some(timeout_ms) = ctx.config.server.request_timeout_ms {
            app = app.layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        }
        Ok(app.with_state(ctx))
    }
}
