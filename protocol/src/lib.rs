//! Wire protocol: envelope framing, encoding/decoding, and authentication.

pub mod auth;
pub mod codec;
pub mod error;

pub use auth::{authenticate, seal, sign, verify};
pub use codec::{decode, decode_frame, encode, encode_frame, Handler, MAX_FRAME_SIZE};
pub use error::ProtocolError;
