use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("could not unmarshal '{msg_type}' message: {reason}")]
    Unmarshal { msg_type: String, reason: String },

    #[error("could not marshal '{msg_type}' message: {reason}")]
    Marshal { msg_type: String, reason: String },
}
