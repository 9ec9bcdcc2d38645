//! Fundamental types for the Hushcom protocol.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the closed public-key abstraction, secret key material, and sender timestamps.

pub mod error;
pub mod keys;
pub mod time;

pub use error::KeyError;
pub use keys::{KeyPair, PublicKey, SecretKey, KEY_LEN};
pub use time::{Clock, SystemClock, Timestamp};
