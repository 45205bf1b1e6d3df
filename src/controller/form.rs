//! The entry form page and its static assets.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::SignedCookieJar;
use serde::{Deserialize, Serialize};

use super::{flash, format, routes::Routes};
use crate::{
    app::AppContext,
    ontology::Iri,
    views::{
        self,
        form::{FetchTarget, FormMachine},
        ViewRenderer,
    },
    Error, Result,
};

/// Selections to restore when rendering the form.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FormQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

fn selected(value: Option<&str>) -> Option<Iri> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Iri::new(v).ok())
}

/// Drives a [`FormMachine`] through the requested selections, fetching each
/// dependent listing from the store.
async fn prepare(ctx: &AppContext, query: &FormQuery) -> FormMachine {
    let introspector = ctx.introspector();
    let mut machine = FormMachine::new();

    let Some(class) = selected(query.class_uri.as_deref()) else {
        return machine;
    };
    if let Some(ticket) = machine.select_class(Some(class.clone())) {
        let listing = introspector.list_properties(&class).await;
        if let Err(err) = &listing {
            tracing::error!(err.msg = %err, err.detail = ?err, "form_properties_error");
        }
        machine.properties_loaded(&ticket, listing);
    }

    let Some(property) = selected(query.property.as_deref()) else {
        return machine;
    };
    if let Some(ticket) = machine.select_property(Some(&property)) {
        let range = match ticket.target() {
            FetchTarget::Instances { range } => range.clone(),
            FetchTarget::Properties { .. } => None,
        };
        let listing = introspector.list_instances(range.as_ref()).await;
        if let Err(err) = &listing {
            tracing::error!(err.msg = %err, err.detail = ?err, "form_instances_error");
        }
        machine.instances_loaded(&ticket, listing);
    }
    machine
}

/// Renders the entry form.
///
/// # Errors
/// When the classes cannot be listed or the view fails to render.
pub async fn index(
    State(ctx): State<AppContext>,
    jar: SignedCookieJar,
    Query(query): Query<FormQuery>,
) -> Result<Response> {
    let (jar, messages) = flash::take(jar);
    let classes = ctx.introspector().list_classes().await?;
    let machine = prepare(&ctx, &query).await;

    let body = ctx.view.render(
        "index.html",
        serde_json::json!({
            "form": machine.view(&classes),
            "messages": messages,
        }),
    )?;
    Ok((jar, format::html(&body)?).into_response())
}

/// Serves an embedded file from `assets/static`.
///
/// # Errors
/// [`Error::NotFound`] for unknown paths.
pub async fn static_file(Path(path): Path<String>) -> Result<Response> {
    let content = views::static_asset(&path).ok_or(Error::NotFound)?;
    format::typed(views::content_type(&path), content)
}

pub fn routes() -> Routes {
    Routes::new()
        .add("/", get(index))
        .add("/static/{*path}", get(static_file))
}
