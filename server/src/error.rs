use hushcom_messages::PayloadError;
use hushcom_protocol::ProtocolError;
use hushcom_registry::RegistryError;
use hushcom_relay::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),
}
