use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("system entropy source failed: {0}")]
    Entropy(String),
}
