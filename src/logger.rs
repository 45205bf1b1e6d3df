//! Initializes `tracing` from the `logger` configuration section.

use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::{config, Error, Result};

const MODULE_WHITELIST: &[&str] = &["ontoform", "tower_http", "sea_orm::database", "sqlx::query"];

const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "ontoform";
const DEFAULT_FILE_SUFFIX: &str = "log";

// Dropping the guard stops the background writer.
static NONBLOCKING_WORK_GUARD_KEEP: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber.
///
/// `RUST_LOG`, when set, wins over the configured level and
/// `override_filter`.
///
/// # Errors
/// When the log directory cannot be used, or a subscriber is already set.
pub fn init(config: &config::Logger) -> Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();

    if let Some(file_appender_config) = config.file_appender.as_ref() {
        if file_appender_config.enable {
            let dir = file_appender_config
                .dir
                .as_deref()
                .unwrap_or(DEFAULT_LOG_DIR);
            let rotation = match file_appender_config.rotation {
                config::LogRotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
                config::LogRotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
                config::LogRotation::Daily => tracing_appender::rolling::Rotation::DAILY,
                config::LogRotation::Never => tracing_appender::rolling::Rotation::NEVER,
            };
            let file_appender = tracing_appender::rolling::Builder::default()
                .max_log_files(file_appender_config.max_log_files)
                .rotation(rotation)
                .filename_prefix(
                    file_appender_config
                        .filename_prefix
                        .as_deref()
                        .unwrap_or(DEFAULT_FILE_PREFIX),
                )
                .filename_suffix(
                    file_appender_config
                        .filename_suffix
                        .as_deref()
                        .unwrap_or(DEFAULT_FILE_SUFFIX),
                )
                .build(dir)
                .map_err(Error::wrap)?;

            let level = level_filter(file_appender_config.level);
            let file_appender_layer = if file_appender_config.non_blocking {
                let (non_blocking_file_appender, work_guard) =
                    tracing_appender::non_blocking(file_appender);
                NONBLOCKING_WORK_GUARD_KEEP
                    .set(work_guard)
                    .map_err(|_| Error::string("cannot lock for appender"))?;
                init_layer(non_blocking_file_appender, file_appender_config.format, false)
            } else {
                init_layer(file_appender, file_appender_config.format, false)
            };
            layers.push(file_appender_layer.with_filter(level).boxed());
        }
    }

    if config.enable {
        layers.push(init_layer(std::io::stdout, config.format, true));
    }

    if !layers.is_empty() {
        let env_filter = init_env_filter(config.override_filter.as_deref(), config.level);
        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|err| Error::Message(format!("logger initialization failed: {err}")))?;
    }
    Ok(())
}

fn level_filter(level: config::LogLevel) -> LevelFilter {
    match level {
        config::LogLevel::Off => LevelFilter::OFF,
        config::LogLevel::Trace => LevelFilter::TRACE,
        config::LogLevel::Debug => LevelFilter::DEBUG,
        config::LogLevel::Info => LevelFilter::INFO,
        config::LogLevel::Warn => LevelFilter::WARN,
        config::LogLevel::Error => LevelFilter::ERROR,
    }
}

fn default_directives(level: config::LogLevel) -> String {
    MODULE_WHITELIST
        .iter()
        .map(|module| format!("{module}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn init_env_filter(override_filter: Option<&str>, level: config::LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| match override_filter {
            Some(directives) => EnvFilter::try_new(directives),
            None => EnvFilter::try_new(default_directives(level)),
        })
        .unwrap_or_else(|err| {
            eprintln!("invalid log filter ({err}), falling back to `{level}`");
            EnvFilter::new(level.to_string())
        })
}

fn init_layer<W2>(
    make_writer: W2,
    format: config::LogFormat,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Sync + Send>
where
    W2: for<'writer> MakeWriter<'writer> + Sync + Send + 'static,
{
    match format {
        config::LogFormat::Compact => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .compact()
            .boxed(),
        config::LogFormat::Pretty => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .pretty()
            .boxed(),
        config::LogFormat::Json => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .json()
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_whitelisted_modules() {
        let directives = default_directives(config::LogLevel::Debug);
        assert!(directives.starts_with("ontoform=debug"));
        assert!(directives.contains("tower_http=debug"));
    }
}
