use serde::Serialize;
use tokio::sync::mpsc;

use crate::session::NormalizedEvent;

/// What subscribers receive: batches of normalized events, plus the
/// one-shot bootstrap-finished signal.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BridgeEvent {
    Batch(Vec<NormalizedEvent>),
    InitComplete,
}

/// Seam through which the poll loop republishes events.
///
/// Emission is fire-and-forget: ownership of the events transfers to the
/// implementation and delivery failures are its problem to report.
pub trait EventEmitter: Send + Sync + 'static {
    /// Deliver a batch of normalized events, in order.
    fn emit_events(&self, events: Vec<NormalizedEvent>);

    /// Signal that session bootstrap finished.
    fn emit_init_complete(&self);
}

/// Emitter backed by an unbounded channel, for consumers that drain
/// events from an async task.
pub struct ChannelEmitter {
    event_tx: mpsc::UnboundedSender<BridgeEvent>,
}

impl ChannelEmitter {
    pub fn new(event_tx: mpsc::UnboundedSender<BridgeEvent>) -> Self {
        Self { event_tx }
    }
}

impl EventEmitter for ChannelEmitter {
    fn emit_events(&self, events: Vec<NormalizedEvent>) {
        if self.event_tx.send(BridgeEvent::Batch(events)).is_err() {
            tracing::debug!("Event receiver closed, dropping batch");
        }
    }

    fn emit_init_complete(&self) {
        if self.event_tx.send(BridgeEvent::InitComplete).is_err() {
            tracing::debug!("Event receiver closed, dropping init signal");
        }
    }
}
