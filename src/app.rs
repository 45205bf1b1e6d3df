//! Shared state handed to every request handler.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    config::Config,
    environment::Environment,
    ontology::{AssertionService, Iri, SchemaIntrospector},
    store::StoreHandle,
    views::TeraView,
    Result,
};

/// Cloneable application context.
///
/// Holds the store handle, the template engine, the loaded configuration and
/// the key signing flash cookies. Nothing else is shared between requests.
#[derive(Clone)]
pub struct AppContext {
    /// The environment in which the application is running.
    pub environment: Environment,
    pub config: Config,
    pub store: StoreHandle,
    pub view: TeraView,
    pub cookie_key: Key,
}

impl AppContext {
    /// Introspector over the current store contents.
    #[must_use]
    pub fn introspector(&self) -> SchemaIntrospector {
        SchemaIntrospector::new(self.store.clone())
    }

    /// Assertion service minting subjects below the configured base IRI.
    ///
    /// # Errors
    /// Fails when `ontology.base_iri` is not a valid IRI.
    pub fn assertions(&self) -> Result<AssertionService> {
        let base = Iri::new(self.config.ontology.base_iri.as_str())?;
        Ok(AssertionService::new(self.store.clone(), base))
    }
}

impl FromRef<AppContext> for Key {
    fn from_ref(ctx: &AppContext) -> Self {
        ctx.cookie_key.clone()
    }
}
