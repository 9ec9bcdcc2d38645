//! Node configuration with TOML file support.

use std::path::Path;

use hushcom_crypto::{generate_keypair, keypair_from_secret};
use hushcom_messages::DEFAULT_SERVER_NAME;
use hushcom_types::{KeyPair, SecretKey};
use serde::{Deserialize, Serialize};

use crate::{LogFormat, NodeError};

/// Configuration for a Hushcom node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Nickname the server answers as and clients address.
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Base64 secret of the server content key. Generated per run when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_key: Option<String>,

    /// Bound of the relay → engine queue.
    #[serde(default = "default_queue_capacity")]
    pub inbound_queue_capacity: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.server_name.is_empty() {
            return Err(NodeError::Config("server_name must not be empty".into()));
        }
        if self.inbound_queue_capacity == 0 {
            return Err(NodeError::Config(
                "inbound_queue_capacity must be at least 1".into(),
            ));
        }
        if tracing_subscriber::EnvFilter::try_new(&self.log_level).is_err() {
            return Err(NodeError::Config(format!(
                "log_level {:?} is not a valid filter",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_name(&self.log_format)
    }

    /// The configured content key, or a freshly generated one.
    ///
    /// The flag is `true` when the key was generated.
    pub fn content_keypair(&self) -> Result<(KeyPair, bool), NodeError> {
        match &self.content_key {
            Some(secret) => Ok((keypair_from_secret(SecretKey::from_b64(secret)?), false)),
            None => Ok((generate_keypair()?, true)),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            content_key: None,
            inbound_queue_capacity: default_queue_capacity(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
