//! Turns a submitted entry form into statements.
//!
//! Validation happens up front and nothing is written unless every check
//! passes. The subject declaration (`rdf:type`, `rdfs:label`) and the asserted
//! triple are then committed through a single [`crate::store::GraphStore::insert_all`] call.

use serde::Deserialize;

use super::{
    entities::{Literal, ObjectKind, ObjectValue, Triple},
    introspector::SchemaIntrospector,
    value_objects::{Iri, IriError},
    vocab::{self, rdf, rdfs, xsd},
};
use crate::store::{StoreError, StoreHandle};

/// Raw form fields as posted by the browser.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AssertionForm {
    #[serde(rename = "subjectName")]
    pub subject_name: Option<String>,
    #[serde(rename = "subjectClass")]
    pub subject_class: Option<String>,
    pub property: Option<String>,
    #[serde(rename = "objectKind")]
    pub object_kind: Option<String>,
    #[serde(rename = "objectValueLiteral")]
    pub object_value_literal: Option<String>,
    #[serde(rename = "objectValueInstance")]
    pub object_value_instance: Option<String>,
}

impl AssertionForm {
    fn field<'a>(value: &'a Option<String>) -> Option<&'a str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, AssertionError> {
        Self::field(value).ok_or(AssertionError::MissingField(name))
    }

    fn required_iri(value: &Option<String>, name: &'static str) -> Result<Iri, AssertionError> {
        let text = Self::required(value, name)?;
        Iri::new(text).map_err(|_| AssertionError::InvalidIri {
            field: name,
            value: text.to_owned(),
        })
    }
}

/// Reasons a submission is rejected.
#[derive(Debug, thiserror::Error)]
pub enum AssertionError {
    #[error("`{0}` is required")]
    MissingField(&'static str),

    #[error("`{field}` is not a valid IRI: {value}")]
    InvalidIri { field: &'static str, value: String },

    #[error("unknown object kind `{0}`")]
    UnknownObjectKind(String),

    /// Both object inputs carried a value.
    #[error("provide either a literal value or an instance, not both")]
    BothObjectValues,

    /// Neither object input carried a value.
    #[error("an object value is required")]
    NoObjectValue,

    /// The populated input does not match the selected kind.
    #[error("object kind is `{expected}` but a {provided} value was given")]
    ObjectKindMismatch {
        expected: ObjectKind,
        provided: ObjectKind,
    },

    #[error("`{0}` is not a declared class")]
    UnknownClass(Iri),

    #[error("`{0}` is not a declared property")]
    UnknownProperty(Iri),

    /// The property's domain does not include the subject class.
    #[error("`{property}` does not apply to `{class}`")]
    PropertyNotApplicable { property: Iri, class: Iri },

    /// The schema declares a different kind for the property.
    #[error("`{property}` expects a {expected} object")]
    PropertyKindMismatch { property: Iri, expected: ObjectKind },

    #[error("`{0}` is not a known instance")]
    UnknownInstance(Iri),

    /// The minted subject coincides with a declared class or property.
    #[error("`{0}` is a schema term and cannot be described as an instance")]
    SchemaSubject(Iri),

    #[error("`{value}` is not a valid {datatype}")]
    InvalidLiteral { value: String, datatype: Iri },

    #[error(transparent)]
    Iri(#[from] IriError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AssertionError {
    /// Whether the failure was caused by the submitted data.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// What a successful submission did to the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionOutcome {
    pub triple: Triple,
    /// The subject was declared by this submission.
    pub created_subject: bool,
    /// The triple was already stored.
    pub duplicate: bool,
    /// Range class the instance object is not typed with.
    pub range_mismatch: Option<Iri>,
}

/// Validates entry forms and commits them to the store.
pub struct AssertionService {
    store: StoreHandle,
    introspector: SchemaIntrospector,
    base_iri: Iri,
}

impl AssertionService {
    #[must_use]
    pub fn new(store: StoreHandle, base_iri: Iri) -> Self {
        Self {
            introspector: SchemaIntrospector::new(store.clone()),
            store,
            base_iri,
        }
    }

    /// Validates `form` and writes the resulting statements.
    ///
    /// # Errors
    /// Any [`AssertionError`]; when one is returned nothing has been written.
    pub async fn add(&self, form: &AssertionForm) -> Result<AssertionOutcome, AssertionError> {
        let subject_name = AssertionForm::required(&form.subject_name, "subjectName")?;
        let class = AssertionForm::required_iri(&form.subject_class, "subjectClass")?;
        let property_iri = AssertionForm::required_iri(&form.property, "property")?;
        let kind_text = AssertionForm::required(&form.object_kind, "objectKind")?;
        let kind: ObjectKind = kind_text
            .parse()
            .map_err(|_| AssertionError::UnknownObjectKind(kind_text.to_owned()))?;

        let literal = AssertionForm::field(&form.object_value_literal);
        let instance = AssertionForm::field(&form.object_value_instance);
        let provided = match (literal, instance) {
            (Some(_), Some(_)) => return Err(AssertionError::BothObjectValues),
            (None, None) => return Err(AssertionError::NoObjectValue),
            (Some(_), None) => ObjectKind::Literal,
            (None, Some(_)) => ObjectKind::Instance,
        };
        if provided != kind {
            return Err(AssertionError::ObjectKindMismatch {
                expected: kind,
                provided,
            });
        }

        if !self.introspector.is_class(&class).await? {
            return Err(AssertionError::UnknownClass(class));
        }
        let Some(property) = self.introspector.property(&property_iri).await? else {
            return Err(AssertionError::UnknownProperty(property_iri));
        };
        if !self.introspector.domains_of(&property_iri).await?.contains(&class) {
            return Err(AssertionError::PropertyNotApplicable {
                property: property_iri,
                class,
            });
        }
        if let Some(expected) = property.object_kind() {
            if expected != kind {
                return Err(AssertionError::PropertyKindMismatch {
                    property: property_iri,
                    expected,
                });
            }
        }

        let mut range_mismatch = None;
        let object: ObjectValue = match (literal, instance) {
            (Some(value), _) => literal_for(value, property.datatype())?.into(),
            (_, Some(text)) => {
                let target = Iri::new(text).map_err(|_| AssertionError::InvalidIri {
                    field: "objectValueInstance",
                    value: text.to_owned(),
                })?;
                if !self.introspector.is_instance(&target).await? {
                    return Err(AssertionError::UnknownInstance(target));
                }
                if let Some(range) = property.range() {
                    if !self.introspector.is_member(&target, range).await? {
                        range_mismatch = Some(range.clone());
                    }
                }
                target.into()
            }
            (None, None) => return Err(AssertionError::NoObjectValue),
        };

        let subject = Iri::mint(&self.base_iri, subject_name)?;
        if self.introspector.is_class(&subject).await?
            || self.introspector.property(&subject).await?.is_some()
        {
            return Err(AssertionError::SchemaSubject(subject));
        }
        let triple = Triple::new(subject.clone(), property_iri, object);

        let created_subject = !self.introspector.is_member(&subject, &class).await?;
        let duplicate = !created_subject && self.store.contains(&triple).await?;

        let mut batch = Vec::with_capacity(3);
        if created_subject {
            batch.push(Triple::new(subject.clone(), rdf::TYPE.into(), class));
            batch.push(Triple::new(
                subject,
                rdfs::LABEL.into(),
                Literal::plain(subject_name),
            ));
        }
        batch.push(triple.clone());
        let inserted = self.store.insert_all(&batch).await?;

        tracing::info!(
            triple = %triple.to_ntriples(),
            inserted,
            created_subject,
            duplicate,
            "triple asserted"
        );
        Ok(AssertionOutcome {
            triple,
            created_subject,
            duplicate,
            range_mismatch,
        })
    }
}

/// Builds the literal object, checking lexical forms of numeric and boolean
/// datatypes.
fn literal_for(value: &str, datatype: Option<&Iri>) -> Result<Literal, AssertionError> {
    let Some(datatype) = datatype else {
        return Ok(Literal::plain(value));
    };
    let node = datatype.as_named_node();
    if node == xsd::STRING || node == rdfs::LITERAL || !vocab::is_datatype(datatype.as_str()) {
        return Ok(Literal::plain(value));
    }

    let valid = if node == xsd::INTEGER {
        value.parse::<i128>().is_ok()
    } else if node == xsd::DECIMAL {
        is_xsd_decimal(value)
    } else if node == xsd::DOUBLE || node == xsd::FLOAT {
        is_xsd_floating(value)
    } else if node == xsd::BOOLEAN {
        matches!(value, "true" | "false" | "1" | "0")
    } else {
        true
    };
    if !valid {
        return Err(AssertionError::InvalidLiteral {
            value: value.to_owned(),
            datatype: datatype.clone(),
        });
    }
    Ok(Literal::typed(value, datatype.clone()))
}

/// `(+|-)? digits (. digits?)? | (+|-)? . digits`
fn is_xsd_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    (!integer.is_empty() || !fraction.is_empty()) && digits(integer) && digits(fraction)
}

/// Lexical space shared by `xsd:double` and `xsd:float`.
fn is_xsd_floating(value: &str) -> bool {
    if matches!(value, "INF" | "+INF" | "-INF" | "NaN") {
        return true;
    }
    let Some((mantissa, exponent)) = value.split_once(['e', 'E']) else {
        return is_xsd_decimal(value);
    };
    let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    is_xsd_decimal(mantissa)
        && !exponent.is_empty()
        && exponent.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::OntologyFormat,
        store::{loader, GraphStore, MemoryStore, TriplePattern},
    };

    const SCHEMA: &str = r#"
        @prefix ex: <https://example.org/kg/> .
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

        ex:Person a owl:Class .
        ex:Organization a owl:Class .
        ex:worksAt a owl:ObjectProperty ; rdfs:domain ex:Person ; rdfs:range ex:Organization .
        ex:hasName a owl:DatatypeProperty ; rdfs:domain ex:Person , ex:Organization ; rdfs:range xsd:string .
        ex:age a owl:DatatypeProperty ; rdfs:domain ex:Person ; rdfs:range xsd:integer .
        ex:Acme a ex:Organization ; rdfs:label "Acme" .
        ex:Alice a ex:Person ; rdfs:label "Alice" .
    "#;

    async fn service() -> (AssertionService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let (triples, _) =
            loader::parse_document("schema.ttl", OntologyFormat::Turtle, None, SCHEMA.as_bytes())
                .expect("schema parses");
        store.insert_all(&triples).await.expect("seeded");
        let base = Iri::new("https://example.org/kg/").expect("base");
        (AssertionService::new(store.clone(), base), store)
    }

    fn form(name: &str, class: &str, property: &str, kind: &str) -> AssertionForm {
        AssertionForm {
            subject_name: Some(name.to_owned()),
            subject_class: Some(format!("https://example.org/kg/{class}")),
            property: Some(format!("https://example.org/kg/{property}")),
            object_kind: Some(kind.to_owned()),
            ..AssertionForm::default()
        }
    }

    #[tokio::test]
    async fn new_subject_is_declared_with_the_triple() {
        let (service, store) = service().await;
        let before = store.len().await.expect("len");

        let mut submission = form("Bob Smith", "Person", "worksAt", "instance");
        submission.object_value_instance = Some("https://example.org/kg/Acme".to_owned());
        let outcome = service.add(&submission).await.expect("accepted");

        assert!(outcome.created_subject);
        assert!(!outcome.duplicate);
        assert_eq!(outcome.range_mismatch, None);
        assert_eq!(outcome.triple.subject.as_str(), "https://example.org/kg/Bob_Smith");
        assert_eq!(store.len().await.expect("len"), before + 3);

        let labels = store
            .matching(
                &TriplePattern::any()
                    .with_subject(outcome.triple.subject.clone())
                    .with_predicate(rdfs::LABEL.into()),
            )
            .await
            .expect("labels");
        assert_eq!(labels[0].object.display_value(), "Bob Smith");
    }

    #[tokio::test]
    async fn literal_value_is_committed_verbatim() {
        let (service, _) = service().await;
        let mut submission = form("Alice", "Person", "hasName", "literal");
        submission.object_value_literal = Some("Acme Corp".to_owned());
        let outcome = service.add(&submission).await.expect("accepted");

        assert!(!outcome.created_subject);
        assert_eq!(outcome.triple.object, ObjectValue::Literal(Literal::plain("Acme Corp")));
    }

    #[tokio::test]
    async fn resubmission_is_reported_as_duplicate() {
        let (service, store) = service().await;
        let mut submission = form("Alice", "Person", "age", "literal");
        submission.object_value_literal = Some("42".to_owned());

        let first = service.add(&submission).await.expect("accepted");
        let count = store.len().await.expect("len");
        let second = service.add(&submission).await.expect("accepted");

        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(store.len().await.expect("len"), count);
        assert_eq!(
            second.triple.object.as_literal().and_then(Literal::datatype),
            Some(&Iri::from(xsd::INTEGER))
        );
    }

    #[tokio::test]
    async fn both_or_neither_object_values_are_rejected() {
        let (service, store) = service().await;
        let count = store.len().await.expect("len");

        let mut both = form("Alice", "Person", "hasName", "literal");
        both.object_value_literal = Some("Alice".to_owned());
        both.object_value_instance = Some("https://example.org/kg/Acme".to_owned());
        assert!(matches!(
            service.add(&both).await,
            Err(AssertionError::BothObjectValues)
        ));

        let mut neither = form("Alice", "Person", "hasName", "literal");
        neither.object_value_literal = Some("   ".to_owned());
        assert!(matches!(
            service.add(&neither).await,
            Err(AssertionError::NoObjectValue)
        ));

        assert_eq!(store.len().await.expect("len"), count);
    }

    #[tokio::test]
    async fn schema_violations_are_rejected() {
        let (service, _) = service().await;

        let mut wrong_domain = form("Acme", "Organization", "worksAt", "instance");
        wrong_domain.object_value_instance = Some("https://example.org/kg/Acme".to_owned());
        assert!(matches!(
            service.add(&wrong_domain).await,
            Err(AssertionError::PropertyNotApplicable { .. })
        ));

        let mut wrong_kind = form("Alice", "Person", "worksAt", "literal");
        wrong_kind.object_value_literal = Some("Acme".to_owned());
        assert!(matches!(
            service.add(&wrong_kind).await,
            Err(AssertionError::PropertyKindMismatch {
                expected: ObjectKind::Instance,
                ..
            })
        ));

        let mut bad_number = form("Alice", "Person", "age", "literal");
        bad_number.object_value_literal = Some("forty".to_owned());
        assert!(matches!(
            service.add(&bad_number).await,
            Err(AssertionError::InvalidLiteral { .. })
        ));

        let mut missing = form("  ", "Person", "age", "literal");
        missing.object_value_literal = Some("4".to_owned());
        let err = service.add(&missing).await.expect_err("rejected");
        assert!(err.is_validation());
        assert!(matches!(err, AssertionError::MissingField("subjectName")));
    }

    #[tokio::test]
    async fn out_of_range_instance_is_added_with_a_warning() {
        let (service, _) = service().await;
        let mut submission = form("Bob", "Person", "worksAt", "instance");
        submission.object_value_instance = Some("https://example.org/kg/Alice".to_owned());

        let outcome = service.add(&submission).await.expect("accepted");
        assert_eq!(
            outcome.range_mismatch.as_ref().map(Iri::as_str),
            Some("https://example.org/kg/Organization")
        );
    }

    #[tokio::test]
    async fn schema_terms_cannot_become_subjects() {
        let (service, store) = service().await;
        let count = store.len().await.expect("len");

        let mut class_name = form("Person", "Person", "hasName", "literal");
        class_name.object_value_literal = Some("x".to_owned());
        let err = service.add(&class_name).await.expect_err("rejected");
        assert!(err.is_validation());
        assert!(matches!(
            err,
            AssertionError::SchemaSubject(ref iri) if iri.as_str() == "https://example.org/kg/Person"
        ));

        let mut property_name = form("worksAt", "Person", "worksAt", "instance");
        property_name.object_value_instance = Some("https://example.org/kg/Acme".to_owned());
        assert!(matches!(
            service.add(&property_name).await,
            Err(AssertionError::SchemaSubject(_))
        ));

        assert_eq!(store.len().await.expect("len"), count);
        assert!(!store
            .contains(&Triple::new(
                Iri::new("https://example.org/kg/Person").expect("iri"),
                rdf::TYPE.into(),
                Iri::new("https://example.org/kg/Person").expect("iri"),
            ))
            .await
            .expect("lookup"));
    }

    #[test]
    fn floating_literals_follow_xsd_lexical_forms() {
        let double = Iri::from(xsd::DOUBLE);
        for accepted in ["1", "-1.5", "+.5", "2.", "1e10", "6.02E+23", "INF", "-INF", "NaN"] {
            assert!(literal_for(accepted, Some(&double)).is_ok(), "{accepted}");
        }
        for rejected in ["inf", "infinity", "nan", "-NaN", "1e", "e5", ".", "1.2.3", " 1"] {
            assert!(
                matches!(
                    literal_for(rejected, Some(&double)),
                    Err(AssertionError::InvalidLiteral { .. })
                ),
                "{rejected}"
            );
        }

        let decimal = Iri::from(xsd::DECIMAL);
        assert!(literal_for("-0.25", Some(&decimal)).is_ok());
        assert!(literal_for("1e3", Some(&decimal)).is_err());
        assert!(literal_for("inf", Some(&decimal)).is_err());
    }
}
