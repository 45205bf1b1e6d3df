//! Writing statements and looking at what is stored.

use axum::{
    extract::{Form, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::SignedCookieJar;
use serde::Serialize;

use super::{
    flash::{self, FlashMessage},
    form::FormQuery,
    format,
    routes::Routes,
};
use crate::{
    app::AppContext,
    ontology::{AssertionForm, AssertionOutcome, ObjectKind, Triple},
    store::TriplePattern,
    views::ViewRenderer,
    Result,
};

const STORE_FAILURE: &str = "The statement could not be saved. Please try again later.";

fn outcome_messages(outcome: &AssertionOutcome) -> Vec<FlashMessage> {
    let statement = format!(
        "{} {} {}",
        outcome.triple.subject.local_name(),
        outcome.triple.predicate.local_name(),
        outcome.triple.object.display_value()
    );
    let mut messages = Vec::new();
    if outcome.duplicate {
        messages.push(FlashMessage::warning(format!(
            "Statement already present: {statement}"
        )));
    } else if outcome.range_mismatch.is_none() {
        messages.push(FlashMessage::success(format!("Statement added: {statement}")));
    }
    if let Some(range) = &outcome.range_mismatch {
        messages.push(FlashMessage::warning(format!(
            "Statement added: {statement}, but {} is not typed as {}",
            outcome.triple.object.display_value(),
            range.local_name()
        )));
    }
    messages
}

/// Location of the form, preselecting what the user had chosen.
fn back_to_form(form: &AssertionForm) -> String {
    let query = FormQuery {
        class_uri: form.subject_class.clone().filter(|v| !v.trim().is_empty()),
        property: form.property.clone().filter(|v| !v.trim().is_empty()),
    };
    match serde_urlencoded::to_string(&query) {
        Ok(encoded) if !encoded.is_empty() => format!("/?{encoded}"),
        _ => "/".to_string(),
    }
}

/// Validates and commits one statement, then redirects back to the form.
///
/// # Errors
/// Only when the redirect itself cannot be built; assertion failures are
/// reported through flash messages.
pub async fn add_triple(
    State(ctx): State<AppContext>,
    jar: SignedCookieJar,
    Form(form): Form<AssertionForm>,
) -> Result<Response> {
    let result = match ctx.assertions() {
        Ok(service) => service.add(&form).await.map_err(crate::Error::from),
        Err(err) => Err(err),
    };

    let (messages, location) = match result {
        Ok(outcome) => (outcome_messages(&outcome), "/".to_string()),
        Err(crate::Error::Assertion(err)) if err.is_validation() => {
            tracing::info!(err.msg = %err, "triple rejected");
            (vec![FlashMessage::error(err.to_string())], back_to_form(&form))
        }
        Err(err) => {
            tracing::error!(err.msg = %err, err.detail = ?err, "add_triple_error");
            (vec![FlashMessage::error(STORE_FAILURE)], back_to_form(&form))
        }
    };

    let jar = flash::push(jar, &messages)?;
    Ok((jar, format::redirect_found(&location)?).into_response())
}

#[derive(Debug, Serialize)]
pub struct TripleRow {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub object_kind: ObjectKind,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl From<&Triple> for TripleRow {
    fn from(triple: &Triple) -> Self {
        let literal = triple.object.as_literal();
        Self {
            subject: triple.subject.to_string(),
            predicate: triple.predicate.to_string(),
            object: triple.object.display_value().to_owned(),
            object_kind: triple.object.kind(),
            datatype: literal.and_then(|l| l.datatype()).map(ToString::to_string),
            language: literal.and_then(|l| l.language()).map(ToOwned::to_owned),
        }
    }
}

/// HTML listing of every stored statement.
///
/// # Errors
/// When the store cannot be read or the view fails to render.
pub async fn view_graph(State(ctx): State<AppContext>, jar: SignedCookieJar) -> Result<Response> {
    let (jar, messages) = flash::take(jar);
    let triples = ctx.store.matching(&TriplePattern::any()).await?;
    let rows: Vec<TripleRow> = triples.iter().map(TripleRow::from).collect();
    let body = ctx.view.render(
        "view_graph.html",
        serde_json::json!({
            "triples": rows,
            "total": rows.len(),
            "messages": messages,
        }),
    )?;
    Ok((jar, format::html(&body)?).into_response())
}

/// The whole graph as N-Triples.
///
/// # Errors
/// When the store cannot be read.
pub async fn export(State(ctx): State<AppContext>) -> Result<Response> {
    let triples = ctx.store.matching(&TriplePattern::any()).await?;
    let mut body = String::new();
    for triple in &triples {
        body.push_str(&triple.to_ntriples());
        body.push('\n');
    }
    format::typed("application/n-triples", body)
}

pub fn routes() -> Routes {
    Routes::new()
        .add("/add_triple", post(add_triple))
        .add("/view_graph", get(view_graph))
        .add("/export.nt", get(export))
}
