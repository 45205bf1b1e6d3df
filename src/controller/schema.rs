//! JSON endpoints feeding the cascading form.
//!
//! Lookups never fail on bad input: a missing, empty, malformed or unknown
//! `class_uri` simply produces an empty array.

use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{format, routes::Routes};
use crate::{
    app::AppContext,
    ontology::{Class, Instance, Iri, ObjectKind, Property},
    Result,
};

#[derive(Debug, Default, Deserialize)]
pub struct ClassFilter {
    pub class_uri: Option<String>,
}

impl ClassFilter {
    /// `None` when no filter was given, `Some(Err)` when it is not an IRI.
    fn parsed(&self) -> Option<Result<Iri, ()>> {
        let raw = self.class_uri.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        Some(Iri::new(raw).map_err(|_| ()))
    }
}

#[derive(Debug, Serialize)]
pub struct ClassResponse {
    pub uri: String,
    pub label: String,
}

impl From<&Class> for ClassResponse {
    fn from(class: &Class) -> Self {
        Self {
            uri: class.iri().to_string(),
            label: class.label().to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub uri: String,
    pub label: String,
    pub object_kind: Option<ObjectKind>,
    pub range: Option<String>,
}

impl From<&Property> for PropertyResponse {
    fn from(property: &Property) -> Self {
        Self {
            uri: property.iri().to_string(),
            label: property.label().to_owned(),
            object_kind: property.object_kind(),
            range: property.range().map(Iri::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstanceResponse {
    pub uri: String,
    pub label: String,
}

impl From<&Instance> for InstanceResponse {
    fn from(instance: &Instance) -> Self {
        Self {
            uri: instance.iri().to_string(),
            label: instance.label().to_owned(),
        }
    }
}

/// Lists every declared class.
///
/// # Errors
/// When the store cannot be read.
pub async fn classes(State(ctx): State<AppContext>) -> Result<Response> {
    let classes = ctx.introspector().list_classes().await?;
    format::json(classes.iter().map(ClassResponse::from).collect::<Vec<_>>())
}

/// Lists the properties whose domain is `class_uri`.
///
/// # Errors
/// When the store cannot be read.
pub async fn properties(
    State(ctx): State<AppContext>,
    Query(filter): Query<ClassFilter>,
) -> Result<Response> {
    let Some(Ok(class)) = filter.parsed() else {
        return format::json(Vec::<PropertyResponse>::new());
    };
    let properties = ctx.introspector().list_properties(&class).await?;
    format::json(
        properties
            .iter()
            .map(PropertyResponse::from)
            .collect::<Vec<_>>(),
    )
}

/// Lists instances, restricted to direct members of `class_uri` when given.
///
/// # Errors
/// When the store cannot be read.
pub async fn instances(
    State(ctx): State<AppContext>,
    Query(filter): Query<ClassFilter>,
) -> Result<Response> {
    let class = match filter.parsed() {
        None => None,
        Some(Ok(class)) => Some(class),
        Some(Err(())) => return format::json(Vec::<InstanceResponse>::new()),
    };
    let instances = ctx.introspector().list_instances(class.as_ref()).await?;
    format::json(
        instances
            .iter()
            .map(InstanceResponse::from)
            .collect::<Vec<_>>(),
    )
}

pub fn routes() -> Routes {
    Routes::at("/api")
        .add("/classes", get(classes))
        .add("/properties", get(properties))
        .add("/instances", get(instances))
}
