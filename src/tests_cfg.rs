//! Fixtures for unit and integration tests.

pub mod config {
    use crate::config::{
        Config, Database, LogFormat, LogLevel, Logger, OntologySettings, Server, StoreBackend,
        StoreSettings,
    };

    #[must_use]
    pub fn test_config() -> Config {
        Config {
            logger: Logger {
                enable: false,
                pretty_backtrace: true,
                level: LogLevel::Off,
                format: LogFormat::Json,
                override_filter: None,
                file_appender: None,
            },
            server: Server {
                binding: "localhost".to_string(),
                port: 5150,
                host: "http://localhost".to_string(),
                secret: "ontoform-test-secret-0123456789abcdef".to_string(),
                request_timeout_ms: None,
            },
            store: StoreSettings {
                backend: StoreBackend::InMemory,
                ..StoreSettings::default()
            },
            database: Database::default(),
            ontology: OntologySettings {
                load_on_boot: false,
                ..OntologySettings::default()
            },
        }
    }
}

pub mod app {
    use crate::{
        app::AppContext,
        boot,
        config::{Config, OntologyFormat, StoreBackend},
        environment::Environment,
        store::loader,
    };

    /// Ontology every test context is seeded with.
    pub const SAMPLE_ONTOLOGY: &str = include_str!("../config/ontology/sample.ttl");

    async fn seeded(config: Config) -> AppContext {
        let ctx = boot::create_context(&Environment::Test, config)
            .await
            .expect("test context");
        let (triples, _) = loader::parse_document(
            "sample.ttl",
            OntologyFormat::Turtle,
            None,
            SAMPLE_ONTOLOGY.as_bytes(),
        )
        .expect("sample ontology parses");
        ctx.store.insert_all(&triples).await.expect("sample ontology stored");
        ctx
    }

    /// Context over an in-memory store holding the sample ontology.
    pub async fn get_app_context() -> AppContext {
        seeded(super::config::test_config()).await
    }

    /// Same as [`get_app_context`], persisted through sea-orm into an
    /// in-memory SQLite database.
    pub async fn get_sqlite_app_context() -> AppContext {
        let mut config = super::config::test_config();
        config.store.backend = StoreBackend::Database;
        config.database.uri = "sqlite::memory:".to_string();
        config.database.min_connections = 1;
        config.database.max_connections = 1;
        config.database.auto_migrate = true;
        seeded(config).await
    }
}
