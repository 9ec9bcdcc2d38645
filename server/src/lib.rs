//! Server protocol engine.
//!
//! Owns the identity and channel registries. Each inbound frame is
//! resolved to a candidate key, authenticated, and dispatched; responses
//! are signed with the relay's content key.

pub mod engine;
pub mod error;

pub use engine::ServerEngine;
pub use error::ServerError;
