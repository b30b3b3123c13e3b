//! Transport seam for delivery loops
//!
//! A delivery loop only knows how to hand a `StreamEvent` to an `EventSink` and
//! how to ask whether the peer is still there. The HTTP endpoint uses
//! `ChannelSink`, whose receiving half becomes the SSE response body.

use std::future::Future;

use tokio::sync::mpsc;

use super::error::DeliveryError;
use super::event::StreamEvent;

/// Destination for one subscriber's events
pub trait EventSink: Send + Sync {
    /// Forward one event; any error ends the delivery loop
    fn send(
        &mut self,
        event: StreamEvent,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    /// Whether the peer has gone away
    fn is_closed(&self) -> bool;

    /// Resolves once the peer has gone away
    fn closed(&self) -> impl Future<Output = ()> + Send;
}

/// Sink backed by a bounded channel
///
/// The transport owns the receiver. Dropping it (client disconnect) closes the
/// sink.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<StreamEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the transport reads from
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    async fn send(&mut self, event: StreamEvent) -> Result<(), DeliveryError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| DeliveryError::TransportDisconnected)
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}
