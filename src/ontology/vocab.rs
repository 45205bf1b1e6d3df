//! Vocabulary terms consulted when reading the schema out of the graph.

use oxrdf::NamedNodeRef;
pub use oxrdf::vocab::{rdf, rdfs, xsd};

/// Terms of the OWL 2 namespace `http://www.w3.org/2002/07/owl#`.
pub mod owl {
    use oxrdf::NamedNodeRef;

    pub const CLASS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
    pub const OBJECT_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const DATATYPE_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");
    pub const ANNOTATION_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#AnnotationProperty");
    pub const ONTOLOGY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
    pub const NAMED_INDIVIDUAL: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#NamedIndividual");
}

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// Types whose instances are schema declarations rather than data.
pub const SCHEMA_TYPES: [NamedNodeRef<'static>; 8] = [
    owl::CLASS,
    rdfs::CLASS,
    owl::OBJECT_PROPERTY,
    owl::DATATYPE_PROPERTY,
    owl::ANNOTATION_PROPERTY,
    rdf::PROPERTY,
    owl::ONTOLOGY,
    owl::NAMED_INDIVIDUAL,
];

/// Whether `iri` names a schema meta-type.
#[must_use]
pub fn is_schema_type(iri: &str) -> bool {
    SCHEMA_TYPES.iter().any(|term| term.as_str() == iri)
}

/// Whether `iri` names a literal datatype (`xsd:*` or `rdfs:Literal`).
#[must_use]
pub fn is_datatype(iri: &str) -> bool {
    iri.starts_with(XSD_NAMESPACE) || iri == rdfs::LITERAL.as_str() || iri == rdf::LANG_STRING.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_datatypes() {
        assert!(is_datatype(xsd::INTEGER.as_str()));
        assert!(is_datatype(rdfs::LITERAL.as_str()));
        assert!(!is_datatype("https://example.org/kg/Organization"));
    }

    #[test]
    fn named_individual_is_not_a_data_type() {
        assert!(is_schema_type(owl::NAMED_INDIVIDUAL.as_str()));
        assert!(!is_schema_type("https://example.org/kg/Person"));
    }
}
