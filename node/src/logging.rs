//! Structured logging initialisation for Hushcom nodes.
//!
//! Two output formats are supported:
//! - [`LogFormat::Human`]: coloured lines for a terminal.
//! - [`LogFormat::Json`]: newline-delimited JSON for log collectors.
//!
//! Output goes to stderr; the daemon's stdout carries frames. `RUST_LOG`
//! takes precedence over the configured level, which may be any filter
//! directive such as `"debug,hushcom_server=trace"`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::NodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line, event fields flattened.
    Json,
}

impl LogFormat {
    /// Parse a config value. Anything other than `"json"` is human output.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}

/// Build the level filter. `RUST_LOG` wins over `level` when set.
pub fn log_filter(level: &str) -> Result<EnvFilter, NodeError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| NodeError::Logging(format!("bad level filter {level:?}: {e}"))),
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// Fails when the level filter does not parse or a subscriber is already
/// installed in this process.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), NodeError> {
    let registry = tracing_subscriber::registry().with(log_filter(level)?);
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => registry.with(layer).try_init(),
        LogFormat::Json => registry
            .with(layer.json().flatten_event(true))
            .try_init(),
    };
    installed.map_err(|e| NodeError::Logging(e.to_string()))
}
