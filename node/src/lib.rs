//! Hushcom node host.
//!
//! The plumbing around the protocol engines:
//! - TOML configuration and structured logging
//! - A queue-backed relay implementation for hosts without a transport
//! - The single-consumer dispatch loop that feeds inbound frames to an engine
//! - Graceful shutdown

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod shutdown;
pub mod tracing_spans;

pub use config::NodeConfig;
pub use dispatch::{run_dispatch_loop, DispatchStats, InboundHandler, InboundQueue};
pub use error::NodeError;
pub use logging::{init_logging, log_filter, LogFormat};
pub use mailbox::MailboxRelay;
pub use shutdown::ShutdownController;
