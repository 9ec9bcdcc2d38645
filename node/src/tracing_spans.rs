//! Pre-built [`tracing::Span`] constructors for node operations.
//!
//! Consistent span names and field sets make traces easy to filter.

use tracing::{debug_span, info_span, Span};

/// Span covering the dispatch of a single inbound frame.
pub fn dispatch_span(handler: &str, seq: u64) -> Span {
    debug_span!("dispatch", handler = %handler, seq = seq)
}

/// Span covering the lifetime of a dispatch loop.
pub fn dispatch_loop_span(handler: &str) -> Span {
    info_span!("dispatch_loop", handler = %handler)
}
