//! Cryptographic helpers for the Hushcom protocol.
//!
//! - **X25519** key pairs for profiles, channels, and the server content key
//! - **HMAC-SHA256** keyed authentication tags over envelope signing bytes,
//!   keyed by a *public* key (see [`sign`] for what that does and does not prove)
//!
//! The asymmetric encryption used for delivery lives in the relay, not here.

pub mod error;
pub mod keys;
pub mod sign;

pub use error::CryptoError;
pub use keys::{generate_keypair, keypair_from_secret, public_from_secret};
pub use sign::{auth_tag, verify_tag, AuthTag, TAG_LEN};
