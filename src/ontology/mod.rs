//! Ontology domain: identifiers, schema entities, the introspector reading
//! them out of the graph, and the service asserting new statements.

pub mod assertion;
pub mod entities;
pub mod introspector;
pub mod value_objects;
pub mod vocab;

pub use assertion::{AssertionError, AssertionForm, AssertionOutcome, AssertionService};
pub use entities::{
    Class, Instance, Literal, ObjectKind, ObjectValue, Property, Triple, UnknownObjectKind,
};
pub use introspector::SchemaIntrospector;
pub use value_objects::{Iri, IriError};
