use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Index, OnConflict},
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectOptions, ConnectionTrait, Database as Connector, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Schema, TransactionTrait,
};

use super::{
    entity::{self, OBJECT_KIND_IRI, OBJECT_KIND_LITERAL, UNIQUE_COLUMN, UNIQUE_INDEX},
    GraphStore, StoreError, TriplePattern,
};
use crate::{
    config::Database,
    ontology::{Iri, Literal, ObjectValue, Triple},
};

/// Rows per multi-value insert, kept under SQLite's bind parameter limit.
const INSERT_CHUNK: usize = 100;

/// Store persisting statements of one named graph into `rdf_statements`.
#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
    graph: String,
}

impl DatabaseStore {
    /// Opens a connection pool using the configured options.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] when the database is unreachable.
    pub async fn connect(config: &Database, graph: &str) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(config.uri.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_millis(config.connect_timeout))
            .idle_timeout(Duration::from_millis(config.idle_timeout))
            .sqlx_logging(config.enable_logging);

        let db = Connector::connect(options).await?;
        Ok(Self::from_connection(db, graph))
    }

    #[must_use]
    pub fn from_connection(db: DatabaseConnection, graph: &str) -> Self {
        Self {
            db,
            graph: graph.to_owned(),
        }
    }

    /// Creates the statements table and its uniqueness index when missing.
    ///
    /// # Errors
    /// Propagates DDL failures.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let mut table = schema.create_table_from_entity(entity::Entity);
        table.if_not_exists();
        self.db.execute(backend.build(&table)).await?;

        let mut index = Index::create();
        index
            .name(UNIQUE_INDEX)
            .table(entity::Entity)
            .col(UNIQUE_COLUMN)
            .unique()
            .if_not_exists();
        self.db.execute(backend.build(&index)).await?;

        tracing::debug!(table = "rdf_statements", "schema ensured");
        Ok(())
    }

    fn to_active_model(&self, triple: &Triple) -> entity::ActiveModel {
        let (object, object_kind, datatype, language) = match &triple.object {
            ObjectValue::Instance(iri) => (
                iri.as_str().to_owned(),
                OBJECT_KIND_IRI,
                String::new(),
                String::new(),
            ),
            ObjectValue::Literal(literal) => (
                literal.value().to_owned(),
                OBJECT_KIND_LITERAL,
                literal
                    .datatype()
                    .map(|datatype| datatype.as_str().to_owned())
                    .unwrap_or_default(),
                literal.language().unwrap_or_default().to_owned(),
            ),
        };

        entity::ActiveModel {
            id: NotSet,
            graph: Set(self.graph.clone()),
            subject: Set(triple.subject.as_str().to_owned()),
            predicate: Set(triple.predicate.as_str().to_owned()),
            object: Set(object),
            object_kind: Set(object_kind.to_owned()),
            datatype: Set(datatype),
            language: Set(language),
            statement_hash: Set(entity::statement_hash(&self.graph, &triple.to_ntriples())),
        }
    }

    fn to_triple(model: entity::Model) -> Result<Triple, StoreError> {
        let id = model.id;
        let corrupt = |reason: String| StoreError::Corrupt { id, reason };

        let subject = Iri::new(model.subject).map_err(|err| corrupt(err.to_string()))?;
        let predicate = Iri::new(model.predicate).map_err(|err| corrupt(err.to_string()))?;
        let object = match model.object_kind.as_str() {
            OBJECT_KIND_IRI => {
                ObjectValue::Instance(Iri::new(model.object).map_err(|err| corrupt(err.to_string()))?)
            }
            OBJECT_KIND_LITERAL if !model.language.is_empty() => {
                Literal::tagged(model.object, model.language).into()
            }
            OBJECT_KIND_LITERAL if !model.datatype.is_empty() => {
                let datatype = Iri::new(model.datatype).map_err(|err| corrupt(err.to_string()))?;
                Literal::typed(model.object, datatype).into()
            }
            OBJECT_KIND_LITERAL => Literal::plain(model.object).into(),
            other => return Err(corrupt(format!("unknown object kind `{other}`"))),
        };

        Ok(Triple {
            subject,
            predicate,
            object,
        })
    }
}

#[async_trait]
impl GraphStore for DatabaseStore {
    fn backend_name(&self) -> &'static str {
        "database"
    }

    async fn insert_all(&self, triples: &[Triple]) -> Result<usize, StoreError> {
        if triples.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        let mut added: u64 = 0;
        for chunk in triples.chunks(INSERT_CHUNK) {
            let models = chunk.iter().map(|triple| self.to_active_model(triple));
            added += entity::Entity::insert_many(models)
                .on_conflict(OnConflict::column(UNIQUE_COLUMN).do_nothing().to_owned())
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(usize::try_from(added).unwrap_or(usize::MAX))
    }

    async fn matching(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError> {
        let mut query = entity::Entity::find().filter(entity::Column::Graph.eq(self.graph.as_str()));

        if let Some(subject) = &pattern.subject {
            query = query.filter(entity::Column::Subject.eq(subject.as_str()));
        }
        if let Some(predicate) = &pattern.predicate {
            query = query.filter(entity::Column::Predicate.eq(predicate.as_str()));
        }
        match &pattern.object {
            Some(ObjectValue::Instance(iri)) => {
                query = query
                    .filter(entity::Column::Object.eq(iri.as_str()))
                    .filter(entity::Column::ObjectKind.eq(OBJECT_KIND_IRI));
            }
            Some(ObjectValue::Literal(literal)) => {
                query = query
                    .filter(entity::Column::Object.eq(literal.value()))
                    .filter(entity::Column::ObjectKind.eq(OBJECT_KIND_LITERAL))
                    .filter(
                        entity::Column::Datatype
                            .eq(literal.datatype().map_or("", |datatype| datatype.as_str())),
                    )
                    .filter(entity::Column::Language.eq(literal.language().unwrap_or_default()));
            }
            None => {}
        }

        query
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Self::to_triple)
            .collect()
    }

    async fn len(&self) -> Result<usize, StoreError> {
        let count = entity::Entity::find()
            .filter(entity::Column::Graph.eq(self.graph.as_str()))
            .count(&self.db)
            .await?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await?;
        Ok(())
    }
}
