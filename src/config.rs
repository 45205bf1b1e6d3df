//! # Configuration
//!
//! Settings are read from `config/{environment}.yaml`. Every file is first
//! rendered as a Tera template, which makes values such as
//!
//! ```yaml
//! database:
//!   uri: '{{ get_env(name="DATABASE_URL", default="sqlite://ontoform.sqlite?mode=rwc") }}'
//! ```
//!
//! resolvable from the process environment. The folder can be relocated with
//! the `ONTOFORM_CONFIG_FOLDER` variable.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{environment::Environment, Error, Result};

const CONFIG_FOLDER_ENV: &str = "ONTOFORM_CONFIG_FOLDER";
const DEFAULT_CONFIG_FOLDER: &str = "config";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logger: Logger,
    pub server: Server,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub ontology: OntologySettings,
}

/// Logger configuration.
///
/// Example (development):
/// ```yaml
/// logger:
///   enable: true
///   level: debug
///   format: compact
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logger {
    pub enable: bool,

    /// Print errors with their full source chain.
    #[serde(default)]
    pub pretty_backtrace: bool,

    pub level: LogLevel,

    pub format: LogFormat,

    /// Replaces the generated filter directives, e.g. `"info,sqlx=warn"`.
    pub override_filter: Option<String>,

    pub file_appender: Option<LoggerFileAppender>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggerFileAppender {
    pub enable: bool,
    #[serde(default)]
    pub non_blocking: bool,
    pub level: LogLevel,
    pub format: LogFormat,
    pub rotation: LogRotation,
    pub dir: Option<String>,
    pub filename_prefix: Option<String>,
    pub filename_suffix: Option<String>,
    pub max_log_files: usize,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Server {
    #[serde(default = "default_binding")]
    pub binding: String,
    pub port: u16,
    /// Public base URL, only used in log output.
    pub host: String,
    /// Key material for signing flash cookies, at least 32 bytes.
    pub secret: String,
    /// Requests running longer are aborted with 408.
    pub request_timeout_ms: Option<u64>,
}

fn default_binding() -> String {
    "localhost".to_string()
}

impl Server {
    #[must_use]
    pub fn full_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which [`crate::store::GraphStore`] adapter to build.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Database,
    InMemory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Identifier of the named graph every statement belongs to.
    #[serde(default = "default_graph")]
    pub graph: String,
}

fn default_graph() -> String {
    "urn:example:knowledge_graph".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            graph: default_graph(),
        }
    }
}

/// Database connection settings, timeouts in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Database {
    pub uri: String,
    #[serde(default)]
    pub enable_logging: bool,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Create the statements table on boot.
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            uri: "sqlite::memory:".to_string(),
            enable_logging: false,
            connect_timeout: 500,
            idle_timeout: 500,
            min_connections: 1,
            max_connections: 1,
            auto_migrate: true,
        }
    }
}

/// Where the schema comes from and how new instances are named.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OntologySettings {
    /// Namespace under which subjects created by the form are minted.
    #[serde(default = "default_base_iri")]
    pub base_iri: String,
    #[serde(default = "default_true")]
    pub load_on_boot: bool,
    #[serde(default)]
    pub sources: Vec<OntologySource>,
}

fn default_base_iri() -> String {
    "https://example.org/kg/data/".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for OntologySettings {
    fn default() -> Self {
        Self {
            base_iri: default_base_iri(),
            load_on_boot: true,
            sources: vec![],
        }
    }
}

/// A single ontology document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OntologySource {
    /// File path or `http(s)` URL.
    pub location: String,
    /// Inferred from the extension when omitted.
    pub format: Option<OntologyFormat>,
    /// Base for relative IRIs; remote documents default to their URL.
    pub base_iri: Option<String>,
}

impl OntologySource {
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    #[must_use]
    pub fn resolved_format(&self) -> OntologyFormat {
        self.format
            .unwrap_or_else(|| OntologyFormat::from_location(&self.location))
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OntologyFormat {
    Turtle,
    NTriples,
    RdfXml,
}

impl OntologyFormat {
    /// Guesses the syntax from a file extension, defaulting to Turtle.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("nt") => Self::NTriples,
            Some("owl" | "rdf" | "xml") => Self::RdfXml,
            _ => Self::Turtle,
        }
    }
}

impl Config {
    /// Loads the configuration of `env` from the configured folder.
    ///
    /// # Errors
    /// Fails when the file is missing, cannot be rendered, or is not valid YAML.
    pub fn new(env: &Environment) -> Result<Self> {
        let folder = std::env::var(CONFIG_FOLDER_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FOLDER), PathBuf::from);
        Self::from_folder(env, &folder)
    }

    /// Loads `<folder>/<env>.yaml`.
    ///
    /// # Errors
    /// Fails when the file is missing, cannot be rendered, or is not valid YAML.
    pub fn from_folder(env: &Environment, folder: &Path) -> Result<Self> {
        let path = folder.join(format!("{env}.yaml"));
        let content = std::fs::read_to_string(&path).map_err(|err| {
            Error::Message(format!(
                "cannot read configuration `{}`: {err}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Renders `content` through Tera, then deserializes it.
    ///
    /// # Errors
    /// Fails on template or YAML errors.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let rendered = tera::Tera::one_off(content, &tera::Context::new(), false)?;
        Ok(serde_yaml::from_str(&rendered)?)
    }
}
