//! Reads the classes, properties and instances declared in the graph.
//!
//! An introspector is cheap to build and holds no cache; every call reflects
//! the store as it is at that moment. Only direct declarations are consulted:
//! no subclass closure, no domain or range inheritance.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use oxrdf::NamedNodeRef;

use super::{
    entities::{Class, Instance, Literal, Property},
    value_objects::Iri,
    vocab::{self, owl, rdf, rdfs},
    ObjectValue, Triple,
};
use crate::store::{StoreError, StoreHandle, TriplePattern};

/// Read-side port over the schema stored in the graph.
#[derive(Clone)]
pub struct SchemaIntrospector {
    store: StoreHandle,
}

impl SchemaIntrospector {
    #[must_use]
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    async fn with_predicate(&self, predicate: NamedNodeRef<'_>) -> Result<Vec<Triple>, StoreError> {
        self.store
            .matching(&TriplePattern::any().with_predicate(predicate.into()))
            .await
    }

    async fn subjects_typed(&self, class_type: NamedNodeRef<'_>) -> Result<Vec<Iri>, StoreError> {
        let pattern = TriplePattern::any()
            .with_predicate(rdf::TYPE.into())
            .with_object(Iri::from(class_type));
        Ok(self
            .store
            .matching(&pattern)
            .await?
            .into_iter()
            .map(|triple| triple.subject)
            .collect())
    }

    /// Best `rdfs:label` per subject, see [`preferred_label`].
    async fn labels(&self) -> Result<HashMap<Iri, String>, StoreError> {
        let mut candidates: HashMap<Iri, Vec<Literal>> = HashMap::new();
        for triple in self.with_predicate(rdfs::LABEL).await? {
            if let ObjectValue::Literal(literal) = triple.object {
                candidates.entry(triple.subject).or_default().push(literal);
            }
        }
        Ok(candidates
            .into_iter()
            .filter_map(|(subject, literals)| {
                preferred_label(&literals).map(|label| (subject, label))
            })
            .collect())
    }

    async fn declared_classes(&self) -> Result<BTreeSet<Iri>, StoreError> {
        let mut classes: BTreeSet<Iri> = self.subjects_typed(owl::CLASS).await?.into_iter().collect();
        classes.extend(self.subjects_typed(rdfs::CLASS).await?);
        Ok(classes)
    }

    /// Every declared class, ordered by label.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list_classes(&self) -> Result<Vec<Class>, StoreError> {
        let mut labels = self.labels().await?;
        let mut classes: Vec<Class> = self
            .declared_classes()
            .await?
            .into_iter()
            .map(|iri| {
                let label = labels.remove(&iri);
                Class::new(iri, label)
            })
            .collect();
        classes.sort_by(|a, b| by_label(a.label(), a.iri(), b.label(), b.iri()));
        Ok(classes)
    }

    /// Whether `iri` is declared as `owl:Class` or `rdfs:Class`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn is_class(&self, iri: &Iri) -> Result<bool, StoreError> {
        for class_type in [owl::CLASS, rdfs::CLASS] {
            let triple = Triple::new(iri.clone(), rdf::TYPE.into(), Iri::from(class_type));
            if self.store.contains(&triple).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Properties whose `rdfs:domain` is `class`, ordered by label.
    ///
    /// An undeclared class yields an empty list.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list_properties(&self, class: &Iri) -> Result<Vec<Property>, StoreError> {
        if !self.is_class(class).await? {
            return Ok(vec![]);
        }

        let pattern = TriplePattern::any()
            .with_predicate(rdfs::DOMAIN.into())
            .with_object(class.clone());
        let candidates: BTreeSet<Iri> = self
            .store
            .matching(&pattern)
            .await?
            .into_iter()
            .map(|triple| triple.subject)
            .collect();
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let classes = self.declared_classes().await?;
        let mut labels = self.labels().await?;
        let mut properties = Vec::with_capacity(candidates.len());
        for iri in candidates {
            let label = labels.remove(&iri);
            properties.push(self.describe_property(iri, label, &classes).await?);
        }
        properties.sort_by(|a, b| by_label(a.label(), a.iri(), b.label(), b.iri()));
        Ok(properties)
    }

    /// Looks up a declared property.
    ///
    /// Anything typed as a property or carrying an `rdfs:domain` counts as
    /// declared.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn property(&self, iri: &Iri) -> Result<Option<Property>, StoreError> {
        let statements = self
            .store
            .matching(&TriplePattern::any().with_subject(iri.clone()))
            .await?;
        let declared = statements.iter().any(|triple| {
            let typed_as_property = triple.predicate.as_named_node() == rdf::TYPE
                && triple.object.as_instance().is_some_and(|object| {
                    let object = object.as_named_node();
                    object == owl::OBJECT_PROPERTY
                        || object == owl::DATATYPE_PROPERTY
                        || object == rdf::PROPERTY
                });
            typed_as_property || triple.predicate.as_named_node() == rdfs::DOMAIN
        });
        if !declared {
            return Ok(None);
        }

        let label = preferred_label(
            statements
                .iter()
                .filter(|triple| triple.predicate.as_named_node() == rdfs::LABEL)
                .filter_map(|triple| triple.object.as_literal()),
        );
        let classes = self.declared_classes().await?;
        self.describe_property(iri.clone(), label, &classes)
            .await
            .map(Some)
    }

    /// Classes named by `rdfs:domain` for `property`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn domains_of(&self, property: &Iri) -> Result<Vec<Iri>, StoreError> {
        let pattern = TriplePattern::any()
            .with_subject(property.clone())
            .with_predicate(rdfs::DOMAIN.into());
        Ok(self
            .store
            .matching(&pattern)
            .await?
            .into_iter()
            .filter_map(|triple| triple.object.as_instance().cloned())
            .collect())
    }

    async fn describe_property(
        &self,
        iri: Iri,
        label: Option<String>,
        classes: &BTreeSet<Iri>,
    ) -> Result<Property, StoreError> {
        let statements = self
            .store
            .matching(&TriplePattern::any().with_subject(iri.clone()))
            .await?;

        let types: Vec<&Iri> = statements
            .iter()
            .filter(|triple| triple.predicate.as_named_node() == rdf::TYPE)
            .filter_map(|triple| triple.object.as_instance())
            .collect();
        let range = statements
            .iter()
            .filter(|triple| triple.predicate.as_named_node() == rdfs::RANGE)
            .find_map(|triple| triple.object.as_instance())
            .cloned();

        let is_object = types.iter().any(|t| t.as_named_node() == owl::OBJECT_PROPERTY);
        let is_data = types.iter().any(|t| t.as_named_node() == owl::DATATYPE_PROPERTY);
        let range_is_datatype = range
            .as_ref()
            .is_some_and(|range| vocab::is_datatype(range.as_str()));

        let property = Property::new(iri, label);
        Ok(if is_object {
            property.linking_to(range.filter(|_| !range_is_datatype))
        } else if is_data {
            property.holding_literals(range.filter(|_| range_is_datatype))
        } else {
            match range {
                Some(range) if range_is_datatype => property.holding_literals(Some(range)),
                Some(range) if classes.contains(&range) => property.linking_to(Some(range)),
                _ => property,
            }
        })
    }

    /// Named individuals, optionally restricted to direct members of `class`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list_instances(&self, class: Option<&Iri>) -> Result<Vec<Instance>, StoreError> {
        if class.is_some_and(|class| vocab::is_schema_type(class.as_str())) {
            return Ok(vec![]);
        }

        let mut memberships: BTreeMap<Iri, Vec<Iri>> = BTreeMap::new();
        for triple in self.with_predicate(rdf::TYPE).await? {
            let ObjectValue::Instance(class_iri) = triple.object else {
                continue;
            };
            if vocab::is_schema_type(class_iri.as_str()) {
                continue;
            }
            memberships.entry(triple.subject).or_default().push(class_iri);
        }

        let mut labels = self.labels().await?;
        let mut instances: Vec<Instance> = memberships
            .into_iter()
            .filter(|(_, classes)| class.map_or(true, |class| classes.contains(class)))
            .map(|(iri, classes)| {
                let label = labels.remove(&iri);
                Instance::new(iri, label, classes)
            })
            .collect();
        instances.sort_by(|a, b| by_label(a.label(), a.iri(), b.label(), b.iri()));
        Ok(instances)
    }

    /// Whether `iri` is typed with at least one non-schema class.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn is_instance(&self, iri: &Iri) -> Result<bool, StoreError> {
        let pattern = TriplePattern::any()
            .with_subject(iri.clone())
            .with_predicate(rdf::TYPE.into());
        Ok(self
            .store
            .matching(&pattern)
            .await?
            .iter()
            .filter_map(|triple| triple.object.as_instance())
            .any(|class| !vocab::is_schema_type(class.as_str())))
    }

    /// Whether `instance rdf:type class` is stated.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn is_member(&self, instance: &Iri, class: &Iri) -> Result<bool, StoreError> {
        self.store
            .contains(&Triple::new(instance.clone(), rdf::TYPE.into(), class.clone()))
            .await
    }
}

/// First untagged or English label, otherwise the first label in any language.
fn preferred_label<'a>(literals: impl IntoIterator<Item = &'a Literal>) -> Option<String> {
    let mut fallback = None;
    for literal in literals {
        match literal.language() {
            None | Some("en") => return Some(literal.value().to_owned()),
            Some(_) => {
                fallback.get_or_insert_with(|| literal.value().to_owned());
            }
        }
    }
    fallback
}

fn by_label(a_label: &str, a_iri: &Iri, b_label: &str, b_iri: &Iri) -> std::cmp::Ordering {
    a_label
        .to_lowercase()
        .cmp(&b_label.to_lowercase())
        .then_with(|| a_iri.cmp(b_iri))
}
