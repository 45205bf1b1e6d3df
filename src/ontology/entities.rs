use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::{Literal as RdfLiteral, NamedNode, Term};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value_objects::Iri;

/// Ontology class offered as a subject type in the entry form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Class {
    #[serde(rename = "uri")]
    iri: Iri,
    label: String,
}

impl Class {
    /// Creates a class, falling back to the IRI local name when no label is known.
    #[must_use]
    pub fn new(iri: Iri, label: Option<String>) -> Self {
        let label = label.unwrap_or_else(|| iri.local_name().to_owned());
        Self { iri, label }
    }

    #[must_use]
    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Classifies the values a property expects as object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Scalar values (`owl:DatatypeProperty` or a datatype range).
    Literal,
    /// References to other named individuals (`owl:ObjectProperty`).
    Instance,
}

impl ObjectKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Instance => "instance",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = UnknownObjectKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "literal" => Ok(Self::Literal),
            "instance" => Ok(Self::Instance),
            other => Err(UnknownObjectKind(other.to_owned())),
        }
    }
}

/// Raised when text does not name an [`ObjectKind`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown object kind `{0}`")]
pub struct UnknownObjectKind(pub String);

/// Property definition annotated with what its objects must look like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    iri: Iri,
    label: String,
    object_kind: Option<ObjectKind>,
    range: Option<Iri>,
    datatype: Option<Iri>,
}

impl Property {
    /// Creates a property of unknown kind.
    #[must_use]
    pub fn new(iri: Iri, label: Option<String>) -> Self {
        let label = label.unwrap_or_else(|| iri.local_name().to_owned());
        Self {
            iri,
            label,
            object_kind: None,
            range: None,
            datatype: None,
        }
    }

    /// Declares the property as linking to instances of `range`.
    #[must_use]
    pub fn linking_to(mut self, range: Option<Iri>) -> Self {
        self.object_kind = Some(ObjectKind::Instance);
        self.range = range;
        self.datatype = None;
        self
    }

    /// Declares the property as holding literals of `datatype`.
    #[must_use]
    pub fn holding_literals(mut self, datatype: Option<Iri>) -> Self {
        self.object_kind = Some(ObjectKind::Literal);
        self.datatype = datatype;
        self.range = None;
        self
    }

    #[must_use]
    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared kind, `None` when the schema does not say.
    #[must_use]
    pub fn object_kind(&self) -> Option<ObjectKind> {
        self.object_kind
    }

    /// Class an instance-kind object must belong to.
    #[must_use]
    pub fn range(&self) -> Option<&Iri> {
        self.range.as_ref()
    }

    /// Datatype a literal-kind object is typed with.
    #[must_use]
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }
}

/// A named individual and the classes it is typed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    iri: Iri,
    label: String,
    classes: Vec<Iri>,
}

impl Instance {
    #[must_use]
    pub fn new(iri: Iri, label: Option<String>, classes: Vec<Iri>) -> Self {
        let label = label.unwrap_or_else(|| iri.local_name().to_owned());
        Self {
            iri,
            label,
            classes,
        }
    }

    #[must_use]
    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn classes(&self) -> &[Iri] {
        &self.classes
    }
}

/// Literal value with optional datatype or language tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    value: String,
    datatype: Option<Iri>,
    language: Option<String>,
}

impl Literal {
    /// Plain `xsd:string` literal.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    #[must_use]
    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into().to_ascii_lowercase()),
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn to_rdf(&self) -> RdfLiteral {
        if let Some(language) = &self.language {
            if let Ok(literal) =
                RdfLiteral::new_language_tagged_literal(self.value.clone(), language.clone())
            {
                return literal;
            }
        }
        match &self.datatype {
            Some(datatype) => RdfLiteral::new_typed_literal(
                self.value.clone(),
                NamedNode::new_unchecked(datatype.as_str()),
            ),
            None => RdfLiteral::new_simple_literal(self.value.clone()),
        }
    }
}

/// Object position of a [`Triple`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectValue {
    /// Reference to another named individual.
    Instance(Iri),
    /// Scalar value.
    Literal(Literal),
}

impl ObjectValue {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Instance(_) => ObjectKind::Instance,
            Self::Literal(_) => ObjectKind::Literal,
        }
    }

    #[must_use]
    pub fn as_instance(&self) -> Option<&Iri> {
        match self {
            Self::Instance(iri) => Some(iri),
            Self::Literal(_) => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::Instance(_) => None,
        }
    }

    /// Lexical form shown to users.
    #[must_use]
    pub fn display_value(&self) -> &str {
        match self {
            Self::Instance(iri) => iri.as_str(),
            Self::Literal(literal) => literal.value(),
        }
    }

    fn to_term(&self) -> Term {
        match self {
            Self::Instance(iri) => NamedNode::new_unchecked(iri.as_str()).into(),
            Self::Literal(literal) => literal.to_rdf().into(),
        }
    }
}

impl From<Iri> for ObjectValue {
    fn from(iri: Iri) -> Self {
        Self::Instance(iri)
    }
}

impl From<Literal> for ObjectValue {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// A subject–predicate–object statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: ObjectValue,
}

impl Triple {
    #[must_use]
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<ObjectValue>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }

    /// Converts into the `oxrdf` model, used for serialization.
    #[must_use]
    pub fn to_rdf(&self) -> oxrdf::Triple {
        oxrdf::Triple::new(
            NamedNode::new_unchecked(self.subject.as_str()),
            NamedNode::new_unchecked(self.predicate.as_str()),
            self.object.to_term(),
        )
    }

    /// Formats the triple as a single N-Triples line, without newline.
    #[must_use]
    pub fn to_ntriples(&self) -> String {
        format!("{} .", self.to_rdf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    #[test]
    fn labels_fall_back_to_local_name() {
        let class = Class::new(iri("https://example.org/kg/Organization"), None);
        assert_eq!(class.label(), "Organization");
        let labelled = Class::new(iri("https://example.org/kg/Org"), Some("Company".into()));
        assert_eq!(labelled.label(), "Company");
    }

    #[test]
    fn property_kind_switches_clear_the_other_annotation() {
        let property = Property::new(iri("https://example.org/kg/worksAt"), None)
            .holding_literals(Some(iri("http://www.w3.org/2001/XMLSchema#string")))
            .linking_to(Some(iri("https://example.org/kg/Organization")));
        assert_eq!(property.object_kind(), Some(ObjectKind::Instance));
        assert!(property.datatype().is_none());
        assert_eq!(
            property.range().map(Iri::as_str),
            Some("https://example.org/kg/Organization")
        );
    }

    #[test]
    fn object_kind_parses_form_values() {
        assert_eq!("literal".parse(), Ok(ObjectKind::Literal));
        assert_eq!(" instance ".parse(), Ok(ObjectKind::Instance));
        assert!("uri".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn triples_format_as_ntriples() {
        let triple = Triple::new(
            iri("https://example.org/kg/Alice"),
            iri("https://example.org/kg/hasName"),
            Literal::plain("Alice \"A\""),
        );
        assert_eq!(
            triple.to_ntriples(),
            r#"<https://example.org/kg/Alice> <https://example.org/kg/hasName> "Alice \"A\"" ."#
        );

        let typed = Triple::new(
            iri("https://example.org/kg/Alice"),
            iri("https://example.org/kg/age"),
            Literal::typed("42", iri("http://www.w3.org/2001/XMLSchema#integer")),
        );
        assert_eq!(
            typed.to_ntriples(),
            "<https://example.org/kg/Alice> <https://example.org/kg/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
        );
    }
}
