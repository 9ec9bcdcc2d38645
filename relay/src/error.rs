use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("relay unavailable: {0}")]
    Unavailable(String),

    #[error("no key material stored for channel {0}")]
    UnknownChannel(String),

    #[error("{0}")]
    Other(String),
}
