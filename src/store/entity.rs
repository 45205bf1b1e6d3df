//! `rdf_statements` table.
//!
//! Every term column is non-null; the empty string stands for an absent
//! datatype or language. Uniqueness is enforced on `statement_hash`, a BLAKE3
//! digest of the graph identifier and the statement's N-Triples form, so
//! long literals never end up in an index.

use sea_orm::entity::prelude::*;

pub const OBJECT_KIND_IRI: &str = "iri";
pub const OBJECT_KIND_LITERAL: &str = "literal";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rdf_statements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub graph: String,
    #[sea_orm(column_type = "Text")]
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub predicate: String,
    #[sea_orm(column_type = "Text")]
    pub object: String,
    pub object_kind: String,
    #[sea_orm(column_type = "Text")]
    pub datatype: String,
    pub language: String,
    pub statement_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column carrying the statement uniqueness constraint.
pub const UNIQUE_COLUMN: Column = Column::StatementHash;

pub const UNIQUE_INDEX: &str = "idx_rdf_statements_hash";

/// Hex digest identifying `ntriples` within `graph`.
#[must_use]
pub fn statement_hash(graph: &str, ntriples: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(graph.as_bytes());
    hasher.update(b"\n");
    hasher.update(ntriples.as_bytes());
    hasher.finalize().to_hex().to_string()
}
