//! Logging setup
//!
//! Installs a `tracing` subscriber. The filter comes from `RUST_LOG` when it
//! is set, otherwise from `LoggingConfig::default_filter`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// File name prefix for the daily rolling log
const LOG_FILE_PREFIX: &str = "hooks.log";

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Subscriber options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Write to a daily rolling file in this directory instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "agent_hooks=info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(directives) if !directives.is_empty() => {
                EnvFilter::try_new(directives).context("invalid RUST_LOG directives")
            }
            _ => EnvFilter::try_new(&self.default_filter).context("invalid default log filter"),
        }
    }
}

/// Initialize logging with the default configuration
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    init_with(&LoggingConfig::default())
}

/// Initialize logging
///
/// When `log_dir` is set the returned guard must be kept alive, otherwise
/// buffered lines are lost on exit.
pub fn init_with(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (subscriber, guard) = build_subscriber(config)?;
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install subscriber")?;

    tracing::debug!("Logging initialized");
    Ok(guard)
}

/// Build the subscriber described by `config` without installing it
fn build_subscriber(config: &LoggingConfig) -> Result<(BoxedSubscriber, Option<WorkerGuard>)> {
    let filter = config.env_filter()?;

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {:?}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(guard.is_none());

    let subscriber: BoxedSubscriber = if config.json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    };
    Ok((subscriber, guard))
}
