//! Client protocol engine.
//!
//! Builds signed outbound envelopes for the server and for channel peers,
//! and dispatches inbound frames in two tiers: peer handshake and channel
//! content first (no signature check), then server responses, which must
//! verify against the cached server content key.

pub mod engine;
pub mod error;
pub mod output;
pub mod peers;

pub use engine::{ClientEngine, Profile};
pub use error::ClientError;
pub use output::{OutputRecord, OutputSink};
pub use peers::PeerKeys;
