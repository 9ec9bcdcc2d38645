//! Server-owned registries.
//!
//! - [`IdentityRegistry`]: nickname → public key bindings.
//! - [`ChannelRegistry`]: channel name → key, password, admins, users.
//!
//! Both are plain data structures owned by the server engine. They hold no
//! locks; the engine is driven by a single consumer.

pub mod channel;
pub mod error;
pub mod identity;

pub use channel::{ChannelRecord, ChannelRegistry};
pub use error::RegistryError;
pub use identity::IdentityRegistry;
