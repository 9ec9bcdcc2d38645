//! Nullable infrastructure for deterministic testing.
//!
//! The protocol engines reach the outside world only through the
//! [`hushcom_relay::Relay`] trait and a [`hushcom_types::Clock`]. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod relay;

pub use clock::NullClock;
pub use relay::NullRelay;
