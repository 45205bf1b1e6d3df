//! Application bootstrap: building the context, seeding the schema and
//! serving HTTP.

use axum::Router;
use axum_extra::extract::cookie::Key;
use tokio::net::TcpListener;

use crate::{
    app::AppContext,
    config::Config,
    controller::AppRoutes,
    environment::Environment,
    logger,
    store::{
        self,
        loader::{self, LoadReport},
    },
    views::TeraView,
    Error, Result,
};

/// Shortest accepted `server.secret`.
pub const MIN_SECRET_LEN: usize = 32;

/// Where the server listens.
#[derive(Debug, Clone)]
pub struct ServeParams {
    pub port: u16,
    pub binding: String,
}

impl ServeParams {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.server.port,
            binding: config.server.binding.clone(),
        }
    }
}

/// Derives the flash cookie signing key.
///
/// # Errors
/// When the secret is shorter than [`MIN_SECRET_LEN`] bytes.
pub fn cookie_key(secret: &str) -> Result<Key> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(Error::Message(format!(
            "server.secret must be at least {MIN_SECRET_LEN} bytes long"
        )));
    }
    Ok(Key::derive_from(secret.as_bytes()))
}

/// Connects the store, compiles the views and assembles the context.
///
/// # Errors
/// When the store is unreachable, the templates are broken or the secret is
/// too short.
pub async fn create_context(environment: &Environment, config: Config) -> Result<AppContext> {
    let store = store::connect(&config.store, &config.database).await?;
    let view = TeraView::build()?;
    let cookie_key = cookie_key(&config.server.secret)?;
    Ok(AppContext {
        environment: environment.clone(),
        config,
        store,
        view,
        cookie_key,
    })
}

/// Loads the configured ontology documents into the store.
///
/// Without `force`, nothing is loaded when the store already holds a class
/// declaration.
///
/// # Errors
/// When a document cannot be fetched or parsed, or the store rejects it.
pub async fn load_ontology(ctx: &AppContext, force: bool) -> Result<Option<LoadReport>> {
    Ok(loader::ensure_loaded(ctx.store.as_ref(), &ctx.config.ontology, force).await?)
}

/// Router with every application route and middleware.
///
/// # Errors
/// When routes clash.
pub fn create_router(ctx: AppContext) -> Result<Router> {
    AppRoutes::application().to_router(ctx)
}

/// Loads the configuration, initializes logging and builds a ready context,
/// seeding the schema when `ontology.load_on_boot` is set.
///
/// # Errors
/// Any failure of the individual steps.
pub async fn create_app(environment: &Environment) -> Result<AppContext> {
    let config = environment.load()?;
    logger::init(&config.logger)?;
    tracing::info!(environment = %environment, "starting ontoform");
    create_app_with_config(environment, config).await
}

/// Builds the context from an already loaded configuration and runs the boot
/// time ontology load.
///
/// A failed ontology load is logged and the application keeps serving
/// whatever the store already holds.
///
/// # Errors
/// When the context cannot be created.
pub async fn create_app_with_config(environment: &Environment, config: Config) -> Result<AppContext> {
    let ctx = create_context(environment, config).await?;
    if ctx.config.ontology.load_on_boot {
        if let Err(err) = load_ontology(&ctx, false).await {
            tracing::error!(err.msg = %err, err.detail = ?err, "ontology_load_error");
        }
    }
    Ok(ctx)
}

/// Serves `ctx` until ctrl-c or SIGTERM.
///
/// # Errors
/// When binding fails or the server stops with an error.
pub async fn start(ctx: AppContext, params: ServeParams) -> Result<()> {
    let url = ctx.config.server.full_url();
    let router = create_router(ctx)?;
    let listener = TcpListener::bind(format!("{}:{}", params.binding, params.port)).await?;
    tracing::info!(url = %url, binding = %params.binding, port = params.port, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(err.msg = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(err.msg = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        assert!(cookie_key("too short").is_err());
        assert!(cookie_key(&"k".repeat(MIN_SECRET_LEN)).is_ok());
    }
}
