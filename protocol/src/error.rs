use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("failure to authenticate user: {sender} with signature {signature}")]
    Authentication { sender: String, signature: String },

    #[error("unknown message type '{msg_type}' from user {sender}")]
    UnknownMessageType { sender: String, msg_type: String },
}
