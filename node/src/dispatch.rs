//! The inbound dispatch loop.
//!
//! One task consumes frames from a bounded queue and hands each to a single
//! engine, strictly in arrival order. The queue read is the only suspension
//! point; shutdown is observed between frames.

use hushcom_client::{ClientEngine, ClientError};
use hushcom_relay::Relay;
use hushcom_server::{ServerEngine, ServerError};
use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;

use crate::tracing_spans::{dispatch_loop_span, dispatch_span};
use crate::NodeError;

/// An engine that consumes inbound frames.
pub trait InboundHandler: Send {
    type Error: std::error::Error + Send;

    /// Short name for logs and spans.
    const NAME: &'static str;

    fn handle_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}

impl<R: Relay> InboundHandler for ServerEngine<R> {
    type Error = ServerError;
    const NAME: &'static str = "server";

    fn handle_frame(&mut self, frame: &[u8]) -> Result<(), ServerError> {
        self.handle(frame)
    }
}

impl<R: Relay> InboundHandler for ClientEngine<R> {
    type Error = ClientError;
    const NAME: &'static str = "client";

    fn handle_frame(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        self.handle(frame)
    }
}

/// Producer side of the relay → engine queue.
#[derive(Clone)]
pub struct InboundQueue {
    tx: mpsc::Sender<Vec<u8>>,
}

impl InboundQueue {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Wait for room, then enqueue.
    pub async fn push(&self, frame: Vec<u8>) -> Result<(), NodeError> {
        self.tx.send(frame).await.map_err(|_| NodeError::QueueClosed)
    }

    /// Enqueue without waiting.
    pub fn try_push(&self, frame: Vec<u8>) -> Result<(), NodeError> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NodeError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => NodeError::QueueClosed,
        })
    }
}

/// Counters reported when a dispatch loop exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: u64,
    pub failed: u64,
}

/// Feed frames from `inbound` to `handler` until shutdown or the queue closes.
///
/// A failing frame is logged and skipped; it never stops the loop.
pub async fn run_dispatch_loop<H: InboundHandler>(
    handler: &mut H,
    mut inbound: mpsc::Receiver<Vec<u8>>,
    mut shutdown: broadcast::Receiver<()>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    async {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("shutdown requested, dispatch loop exiting");
                    break;
                }
                frame = inbound.recv() => {
                    let Some(frame) = frame else {
                        tracing::info!("inbound queue closed, dispatch loop exiting");
                        break;
                    };
                    let seq = stats.handled + stats.failed;
                    let result = dispatch_span(H::NAME, seq).in_scope(|| handler.handle_frame(&frame));
                    match result {
                        Ok(()) => stats.handled += 1,
                        Err(e) => {
                            stats.failed += 1;
                            tracing::warn!(seq, len = frame.len(), error = %e, "dispatch failed");
                        }
                    }
                }
            }
        }
    }
    .instrument(dispatch_loop_span(H::NAME))
    .await;

    tracing::info!(handled = stats.handled, failed = stats.failed, "dispatch loop stopped");
    stats
}
