use hushcom_crypto::CryptoError;
use hushcom_messages::PayloadError;
use hushcom_protocol::ProtocolError;
use hushcom_relay::RelayError;
use hushcom_types::KeyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no profile loaded")]
    NoProfileLoaded,

    #[error("no key stored for channel {0}")]
    MissingChannelKey(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("invalid key: {0}")]
    Key(#[from] KeyError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("output error: {0}")]
    Output(String),
}
