//! Seeds the graph with the ontology documents named in the configuration.

use std::path::Path;

use oxrdf::Term;
use oxrdfxml::RdfXmlParser;
use oxttl::{NTriplesParser, TurtleParser};

use super::{GraphStore, StoreError, TriplePattern};
use crate::{
    config::{OntologyFormat, OntologySettings, OntologySource},
    ontology::{
        vocab::{owl, rdf, rdfs, xsd},
        Iri, Literal, ObjectValue, Triple,
    },
};

/// Outcome of loading one or more ontology documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Statements read from the documents.
    pub parsed: usize,
    /// Statements that were not already stored.
    pub inserted: usize,
    /// Statements dropped because they involve blank nodes or triple terms.
    pub skipped: usize,
}

/// Parses an RDF document into triples.
///
/// Statements with a blank node or a triple term in subject or object
/// position are counted in the returned skip total and left out.
///
/// # Errors
/// Returns [`StoreError::Parse`] on the first syntax error.
pub fn parse_document(
    location: &str,
    format: OntologyFormat,
    base_iri: Option<&str>,
    bytes: &[u8],
) -> Result<(Vec<Triple>, usize), StoreError> {
    let parse_error = |reason: String| StoreError::Parse {
        location: location.to_owned(),
        reason,
    };

    let mut raw: Vec<oxrdf::Triple> = Vec::new();
    match format {
        OntologyFormat::Turtle => {
            let mut parser = TurtleParser::new();
            if let Some(base) = base_iri {
                parser = parser
                    .with_base_iri(base)
                    .map_err(|err| parse_error(err.to_string()))?;
            }
            for triple in parser.for_reader(bytes) {
                raw.push(triple.map_err(|err| parse_error(err.to_string()))?);
            }
        }
        OntologyFormat::NTriples => {
            for triple in NTriplesParser::new().for_reader(bytes) {
                raw.push(triple.map_err(|err| parse_error(err.to_string()))?);
            }
        }
        OntologyFormat::RdfXml => {
            let mut parser = RdfXmlParser::new();
            if let Some(base) = base_iri {
                parser = parser
                    .with_base_iri(base)
                    .map_err(|err| parse_error(err.to_string()))?;
            }
            for triple in parser.for_reader(bytes) {
                raw.push(triple.map_err(|err| parse_error(err.to_string()))?);
            }
        }
    }

    let total = raw.len();
    let triples: Vec<Triple> = raw.into_iter().filter_map(convert).collect();
    let skipped = total - triples.len();
    Ok((triples, skipped))
}

fn convert(triple: oxrdf::Triple) -> Option<Triple> {
    let subject = match Term::from(triple.subject) {
        Term::NamedNode(node) => Iri::from(node),
        _ => return None,
    };
    let predicate = Iri::from(triple.predicate);
    let object: ObjectValue = match triple.object {
        Term::NamedNode(node) => Iri::from(node).into(),
        Term::Literal(literal) => {
            if let Some(language) = literal.language() {
                Literal::tagged(literal.value(), language).into()
            } else if literal.datatype() == xsd::STRING {
                Literal::plain(literal.value()).into()
            } else {
                Literal::typed(literal.value(), Iri::from(literal.datatype())).into()
            }
        }
        _ => return None,
    };
    Some(Triple::new(subject, predicate, object))
}

/// Reads the raw bytes of a source from disk or over HTTP.
///
/// # Errors
/// Returns [`StoreError::Source`] when the document cannot be retrieved.
pub async fn fetch(source: &OntologySource) -> Result<Vec<u8>, StoreError> {
    let source_error = |reason: String| StoreError::Source {
        location: source.location.clone(),
        reason,
    };

    if source.is_remote() {
        let response = reqwest::get(source.location.as_str())
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| source_error(err.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| source_error(err.to_string()))?;
        Ok(bytes.to_vec())
    } else {
        tokio::fs::read(Path::new(&source.location))
            .await
            .map_err(|err| source_error(err.to_string()))
    }
}

/// Fetches and parses every source, then inserts all statements at once.
///
/// Nothing is stored unless every source could be read, so a partial load
/// never passes for a loaded schema.
///
/// # Errors
/// Stops at the first source that cannot be fetched or parsed, and on store
/// failures.
pub async fn load_sources(
    store: &dyn GraphStore,
    sources: &[OntologySource],
) -> Result<LoadReport, StoreError> {
    let mut report = LoadReport::default();
    let mut statements = Vec::new();
    for source in sources {
        let bytes = fetch(source).await?;
        let base_iri = source.base_iri.as_deref().or_else(|| {
            source
                .is_remote()
                .then_some(source.location.as_str())
        });
        let (triples, skipped) =
            parse_document(&source.location, source.resolved_format(), base_iri, &bytes)?;
        tracing::debug!(
            location = %source.location,
            parsed = triples.len(),
            skipped,
            "ontology source parsed"
        );
        report.parsed += triples.len();
        report.skipped += skipped;
        statements.extend(triples);
    }

    report.inserted = store.insert_all(&statements).await?;
    tracing::info!(
        sources = sources.len(),
        parsed = report.parsed,
        inserted = report.inserted,
        skipped = report.skipped,
        "ontology loaded"
    );
    Ok(report)
}

/// Whether the store already declares at least one class.
///
/// # Errors
/// Propagates store failures.
pub async fn schema_present(store: &dyn GraphStore) -> Result<bool, StoreError> {
    for class_type in [owl::CLASS, rdfs::CLASS] {
        let pattern = TriplePattern::any()
            .with_predicate(rdf::TYPE.into())
            .with_object(Iri::from(class_type));
        if !store.matching(&pattern).await?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Loads the configured ontology unless a schema is already stored.
///
/// Returns `None` when loading was skipped.
///
/// # Errors
/// Propagates fetch, parse and store failures.
pub async fn ensure_loaded(
    store: &dyn GraphStore,
    settings: &OntologySettings,
    force: bool,
) -> Result<Option<LoadReport>, StoreError> {
    if settings.sources.is_empty() {
        tracing::debug!("no ontology sources configured");
        return Ok(None);
    }
    if !force && schema_present(store).await? {
        tracing::info!("ontology already present in the store, skipping load");
        return Ok(None);
    }
    load_sources(store, &settings.sources).await.map(Some)
}
