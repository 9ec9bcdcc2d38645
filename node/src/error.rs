use hushcom_crypto::CryptoError;
use hushcom_types::KeyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid key: {0}")]
    Key(#[from] KeyError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("inbound queue closed")]
    QueueClosed,

    #[error("inbound queue full")]
    QueueFull,
}
