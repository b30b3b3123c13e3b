//! Per-connection delivery loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::hub::{
    BroadcastHub, Dequeued, HubError, Message, QueueReceiver, SubscriberId, Subscription,
};
use crate::stats::DeliveryStats;

use super::error::DeliveryError;
use super::event::StreamEvent;
use super::guard::SubscriptionGuard;
use super::sink::EventSink;
use super::state::{CloseReason, DeliveryPhase};

/// Drains one subscriber queue into one transport connection
///
/// Forwards the initial message first, then every queued message. When the
/// queue stays empty for `keepalive_interval` a ping is forwarded instead.
/// Any forwarding failure, a peer disconnect, the hub releasing the queue or
/// external cancellation closes the loop and unsubscribes.
pub struct DeliveryLoop<S> {
    guard: SubscriptionGuard,
    queue: QueueReceiver,
    initial: Option<Message>,
    sink: S,
    keepalive: Duration,
    send_timeout: Duration,
    phase: DeliveryPhase,
    stats: DeliveryStats,
}

impl<S: EventSink> DeliveryLoop<S> {
    /// Create a loop for an existing subscription
    pub fn new(
        hub: Arc<BroadcastHub>,
        subscription: Subscription,
        initial: Message,
        sink: S,
    ) -> Self {
        let keepalive = hub.config().keepalive_interval;
        let send_timeout = hub.config().send_timeout;
        let (id, queue) = subscription.into_parts();

        Self {
            guard: SubscriptionGuard::new(hub, id),
            queue,
            initial: Some(initial),
            sink,
            keepalive,
            send_timeout,
            phase: DeliveryPhase::Starting,
            stats: DeliveryStats::new(id),
        }
    }

    /// Subscribe to the hub and create a loop for the new subscription
    pub fn subscribe(hub: Arc<BroadcastHub>, sink: S) -> Result<Self, HubError> {
        let (subscription, initial) = hub.subscribe()?;
        Ok(Self::new(hub, subscription, initial, sink))
    }

    /// Subscriber served by this loop
    pub fn id(&self) -> SubscriberId {
        self.guard.id()
    }

    /// Current phase
    pub fn phase(&self) -> DeliveryPhase {
        self.phase
    }

    /// Run until the connection ends
    pub async fn run(self) -> DeliveryStats {
        self.run_until(std::future::pending()).await
    }

    /// Run until the connection ends or `shutdown` resolves
    pub async fn run_until<F>(mut self, shutdown: F) -> DeliveryStats
    where
        F: Future<Output = ()>,
    {
        let reason = tokio::select! {
            reason = self.stream() => reason,
            _ = shutdown => CloseReason::Cancelled,
        };

        self.close(reason);
        self.stats
    }

    async fn stream(&mut self) -> CloseReason {
        if let Some(initial) = self.initial.take() {
            // subscribe() put the same payload at the head of the queue
            let queued = self
                .queue
                .try_dequeue()
                .filter(|m| !m.same_payload(&initial));

            if let Err(e) = self.forward(StreamEvent::message(initial)).await {
                return e.into();
            }
            if let Some(message) = queued {
                if let Err(e) = self.forward(StreamEvent::message(message)).await {
                    return e.into();
                }
            }
        }

        self.phase.begin_streaming();
        tracing::debug!(subscriber = %self.id(), "Delivery loop streaming");

        loop {
            if self.sink.is_closed() {
                return CloseReason::PeerDisconnected;
            }

            let next = tokio::select! {
                _ = self.sink.closed() => return CloseReason::PeerDisconnected,
                next = self.queue.dequeue_with_timeout(self.keepalive) => next,
            };

            let event = match next {
                Dequeued::Message(message) => StreamEvent::message(message),
                Dequeued::TimedOut => StreamEvent::ping(),
                Dequeued::Closed => return CloseReason::QueueClosed,
            };

            if let Err(e) = self.forward(event).await {
                return e.into();
            }
        }
    }

    async fn forward(&mut self, event: StreamEvent) -> Result<(), DeliveryError> {
        let is_ping = event.is_ping();
        let len = event.data.len() as u64;

        match tokio::time::timeout(self.send_timeout, self.sink.send(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(DeliveryError::SendTimeout(self.send_timeout)),
        }

        if is_ping {
            self.stats.pings_sent += 1;
            tracing::trace!(subscriber = %self.id(), "Keep-alive sent");
        } else {
            self.stats.messages_sent += 1;
            self.stats.bytes_sent += len;
            tracing::trace!(subscriber = %self.id(), len = len, "Message sent");
        }

        Ok(())
    }

    fn close(&mut self, reason: CloseReason) {
        if !self.phase.close() {
            return;
        }

        self.guard.release();

        tracing::info!(
            subscriber = %self.id(),
            reason = %reason,
            messages = self.stats.messages_sent,
            pings = self.stats.pings_sent,
            duration_ms = self.stats.duration().as_millis() as u64,
            "Delivery loop closed"
        );

        self.stats.close_reason = Some(reason);
    }
}
