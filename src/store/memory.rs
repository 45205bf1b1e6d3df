use std::{collections::HashSet, sync::RwLock};

use async_trait::async_trait;

use super::{GraphStore, StoreError, TriplePattern};
use crate::ontology::Triple;

#[derive(Default)]
struct Graph {
    order: Vec<Triple>,
    index: HashSet<Triple>,
}

/// Volatile store keeping statements in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    graph: RwLock<Graph>,
}

#[async_trait]
impl GraphStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn insert_all(&self, triples: &[Triple]) -> Result<usize, StoreError> {
        let mut guard = self.graph.write().map_err(|_| StoreError::Poisoned)?;
        let mut added = 0;
        for triple in triples {
            if guard.index.insert(triple.clone()) {
                guard.order.push(triple.clone());
                added += 1;
            }
        }
        Ok(added)
    }

    async fn matching(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError> {
        let guard = self.graph.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .order
            .iter()
            .filter(|triple| pattern.matches(triple))
            .cloned()
            .collect())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        let guard = self.graph.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.order.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.graph.read().map(|_| ()).map_err(|_| StoreError::Poisoned)
    }

    async fn contains(&self, triple: &Triple) -> Result<bool, StoreError> {
        let guard = self.graph.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.index.contains(triple))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Iri, Literal};

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    #[tokio::test]
    async fn duplicate_inserts_are_ignored() {
        let store = MemoryStore::default();
        let triple = Triple::new(
            iri("https://example.org/kg/Alice"),
            iri("https://example.org/kg/hasName"),
            Literal::plain("Alice"),
        );

        assert!(store.insert(&triple).await.expect("insert"));
        assert!(!store.insert(&triple).await.expect("insert again"));
        assert_eq!(store.len().await.expect("len"), 1);
        assert!(store.contains(&triple).await.expect("contains"));
    }

    #[tokio::test]
    async fn matching_preserves_insertion_order() {
        let store = MemoryStore::default();
        let name = iri("https://example.org/kg/hasName");
        let triples = vec![
            Triple::new(iri("https://example.org/kg/Zed"), name.clone(), Literal::plain("Zed")),
            Triple::new(iri("https://example.org/kg/Amy"), name.clone(), Literal::plain("Amy")),
        ];
        assert_eq!(store.insert_all(&triples).await.expect("insert"), 2);

        let found = store
            .matching(&TriplePattern::any().with_predicate(name))
            .await
            .expect("matching");
        assert_eq!(found, triples);
    }
}
