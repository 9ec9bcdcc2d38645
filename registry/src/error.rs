use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("channel {0} already exists")]
    ChannelExists(String),
}
