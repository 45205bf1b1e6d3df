//! Triple persistence.
//!
//! The [`GraphStore`] port is the only way the rest of the application reads or
//! writes statements. Two adapters implement it: [`MemoryStore`] for tests and
//! throwaway development sessions, and [`DatabaseStore`] which persists into a
//! relational database through sea-orm.

pub mod database;
pub mod entity;
pub mod loader;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{Database, StoreBackend, StoreSettings},
    ontology::{Iri, IriError, ObjectValue, Triple},
};

pub use database::DatabaseStore;
pub use memory::MemoryStore;

/// Shared trait object used by the application context.
pub type StoreHandle = Arc<dyn GraphStore>;

/// Errors raised by store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    /// A row could not be mapped back onto a triple.
    #[error("corrupt statement #{id}: {reason}")]
    Corrupt { id: i32, reason: String },

    #[error("in-memory graph lock poisoned")]
    Poisoned,

    #[error("failed to read ontology `{location}`: {reason}")]
    Source { location: String, reason: String },

    #[error("failed to parse ontology `{location}`: {reason}")]
    Parse { location: String, reason: String },

    #[error(transparent)]
    Iri(#[from] IriError),
}

/// Selects triples; `None` positions match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Iri>,
    pub predicate: Option<Iri>,
    pub object: Option<ObjectValue>,
}

impl TriplePattern {
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Iri) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Iri) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: impl Into<ObjectValue>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Whether `triple` satisfies every bound position.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

/// Port describing the triple store consumed by the application.
///
/// Implementations keep set semantics: inserting a statement that already
/// exists is a no-op reported through the returned count.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Short adapter name used in logs.
    fn backend_name(&self) -> &'static str;

    /// Inserts every triple atomically and returns how many were new.
    async fn insert_all(&self, triples: &[Triple]) -> Result<usize, StoreError>;

    /// Returns the triples matching `pattern` in insertion order.
    async fn matching(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError>;

    /// Counts all stored triples.
    async fn len(&self) -> Result<usize, StoreError>;

    /// Checks the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Inserts a single triple, returning `true` if it was new.
    async fn insert(&self, triple: &Triple) -> Result<bool, StoreError> {
        Ok(self.insert_all(std::slice::from_ref(triple)).await? > 0)
    }

    async fn contains(&self, triple: &Triple) -> Result<bool, StoreError> {
        let pattern = TriplePattern {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
        };
        Ok(!self.matching(&pattern).await?.is_empty())
    }

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}

/// Builds the configured store adapter.
///
/// # Errors
/// Fails when the database cannot be reached or its schema cannot be created.
pub async fn connect(
    settings: &StoreSettings,
    database: &Database,
) -> Result<StoreHandle, StoreError> {
    let store: StoreHandle = match settings.backend {
        StoreBackend::InMemory => Arc::new(MemoryStore::default()),
        StoreBackend::Database => {
            let store = DatabaseStore::connect(database, settings.graph.as_str()).await?;
            if database.auto_migrate {
                store.migrate().await?;
            }
            Arc::new(store)
        }
    };
    tracing::info!(backend = store.backend_name(), graph = %settings.graph, "graph store ready");
    Ok(store)
}
