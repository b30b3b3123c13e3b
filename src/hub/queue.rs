//! Bounded per-subscriber mailbox
//!
//! Each subscriber gets one bounded FIFO. The hub holds the sending half and only
//! ever enqueues; the delivery loop holds the receiving half and only dequeues.
//! Enqueue never waits for room: a full mailbox refuses the message.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use super::message::{Message, SubscriberId};

/// Result of offering a message to a subscriber queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Message accepted
    Queued,
    /// Queue at capacity; message dropped for this subscriber only
    Full,
    /// Receiving side is gone; the subscriber is dead
    Closed,
}

impl EnqueueOutcome {
    /// Whether the message was accepted
    pub fn is_queued(self) -> bool {
        self == EnqueueOutcome::Queued
    }
}

/// Result of waiting on a subscriber queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    /// A published message
    Message(Message),
    /// Nothing arrived within the wait window
    TimedOut,
    /// The hub released this queue (unsubscribe or shutdown)
    Closed,
}

/// Create a subscriber queue with the given capacity (clamped to at least 1)
pub(crate) fn subscriber_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, QueueReceiver { rx, capacity })
}

/// Hub-side half of a subscriber queue
#[derive(Debug)]
pub(crate) struct QueueSender {
    tx: mpsc::Sender<Message>,
}

impl QueueSender {
    /// Offer a message without blocking
    pub(crate) fn try_enqueue(&self, message: Message) -> EnqueueOutcome {
        match self.tx.try_send(message) {
            Ok(()) => EnqueueOutcome::Queued,
            Err(TrySendError::Full(_)) => EnqueueOutcome::Full,
            Err(TrySendError::Closed(_)) => EnqueueOutcome::Closed,
        }
    }
}

/// Subscriber-side half of a subscriber queue
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<Message>,
    capacity: usize,
}

impl QueueReceiver {
    /// Maximum number of pending messages
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait up to `timeout` for the next message
    pub async fn dequeue_with_timeout(&mut self, timeout: Duration) -> Dequeued {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(message)) => Dequeued::Message(message),
            Ok(None) => Dequeued::Closed,
            Err(_) => Dequeued::TimedOut,
        }
    }

    /// Take the next message if one is already waiting
    pub fn try_dequeue(&mut self) -> Option<Message> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Handle returned by `BroadcastHub::subscribe`
///
/// Owns the receiving half of the subscriber's queue. Dropping it marks the
/// queue dead; the hub removes it on the next publish.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    queue: QueueReceiver,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, queue: QueueReceiver) -> Self {
        Self { id, queue }
    }

    /// Identifier to pass to `BroadcastHub::unsubscribe`
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Mutable access to the queue
    pub fn queue(&mut self) -> &mut QueueReceiver {
        &mut self.queue
    }

    /// Split into identifier and queue
    pub fn into_parts(self) -> (SubscriberId, QueueReceiver) {
        (self.id, self.queue)
    }
}
