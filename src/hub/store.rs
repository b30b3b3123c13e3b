//! Broadcast hub implementation
//!
//! The central hub that owns the subscriber set and the latest-message slot and
//! fans every published message out to all subscriber queues.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::stats::{HubCounters, HubStats, PublishReport};

use super::config::HubConfig;
use super::error::HubError;
use super::message::{Message, SubscriberId};
use super::queue::{subscriber_queue, EnqueueOutcome, QueueSender, Subscription};

/// State guarded by the hub lock
#[derive(Debug)]
struct HubState {
    /// Registered subscriber queues (hub-side halves)
    subscribers: HashMap<SubscriberId, QueueSender>,
    /// Most recently published message, or the placeholder
    latest: Message,
    /// Set by `shutdown`; refuses new subscribers
    closed: bool,
}

/// Central broadcast hub
///
/// Every mutation (`subscribe`, `unsubscribe`, `publish`) runs under one
/// mutex. None of them awaits or performs I/O while holding it, so the hub can
/// be called from async tasks and from blocking threads alike.
#[derive(Debug)]
pub struct BroadcastHub {
    state: Mutex<HubState>,
    config: HubConfig,
    next_id: AtomicU64,
    counters: HubCounters,
    created_at: Instant,
}

impl BroadcastHub {
    /// Create a new hub with default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a new hub with custom configuration
    ///
    /// Zero capacity or durations are raised to their floor
    /// (see `HubConfig::clamped`).
    pub fn with_config(config: HubConfig) -> Self {
        let config = config.clamped();
        let latest = Message::from(config.initial_message.as_str());

        Self {
            state: Mutex::new(HubState {
                subscribers: HashMap::new(),
                latest,
                closed: false,
            }),
            config,
            next_id: AtomicU64::new(1),
            counters: HubCounters::default(),
            created_at: Instant::now(),
        }
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    // A panic while holding the lock cannot leave the map half-updated: every
    // critical section is a single insert/remove/retain. Keep serving.
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new subscriber
    ///
    /// The new queue already holds the current latest message, and a copy of
    /// that message is returned so a transport can deliver it immediately.
    pub fn subscribe(&self) -> Result<(Subscription, Message), HubError> {
        let mut state = self.lock();

        if state.closed {
            self.counters.record_rejection();
            return Err(HubError::Closed);
        }

        let limit = self.config.max_subscribers;
        if limit > 0 && state.subscribers.len() >= limit {
            self.counters.record_rejection();
            tracing::warn!(
                subscribers = state.subscribers.len(),
                limit = limit,
                "Subscriber rejected: limit reached"
            );
            return Err(HubError::ResourceExhausted { limit });
        }

        let (tx, rx) = subscriber_queue(self.config.queue_capacity);
        let initial = state.latest.clone();

        // Fresh queue, capacity >= 1: always accepted
        tx.try_enqueue(initial.clone());

        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        state.subscribers.insert(id, tx);
        self.counters.record_subscribe();

        tracing::info!(
            subscriber = %id,
            subscribers = state.subscribers.len(),
            initial_len = initial.len(),
            "Subscriber added"
        );

        Ok((Subscription::new(id, rx), initial))
    }

    /// Remove a subscriber
    ///
    /// Idempotent. Returns true only if the subscriber was still registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut state = self.lock();
        let removed = state.subscribers.remove(&id).is_some();

        if removed {
            self.counters.record_unsubscribe();
            tracing::debug!(
                subscriber = %id,
                subscribers = state.subscribers.len(),
                "Subscriber removed"
            );
        }

        removed
    }

    /// Publish a message to every subscriber
    ///
    /// Updates the latest-message slot, then offers the message to each queue
    /// without waiting. A full queue loses this message but keeps its
    /// subscriber; a queue whose receiver is gone is removed.
    pub fn publish(&self, message: impl Into<Message>) -> PublishReport {
        let message = message.into();
        let mut report = PublishReport::default();

        let mut state = self.lock();
        state.latest = message.clone();

        state
            .subscribers
            .retain(|id, queue| match queue.try_enqueue(message.clone()) {
                EnqueueOutcome::Queued => {
                    report.queued += 1;
                    true
                }
                EnqueueOutcome::Full => {
                    report.dropped += 1;
                    tracing::warn!(subscriber = %id, "Subscriber queue full, message dropped");
                    true
                }
                EnqueueOutcome::Closed => {
                    report.evicted += 1;
                    tracing::debug!(subscriber = %id, "Subscriber queue closed, removing");
                    false
                }
            });
        let subscribers = state.subscribers.len();
        drop(state);

        self.counters.record_publish(&report);

        tracing::debug!(
            len = message.len(),
            subscribers = subscribers,
            queued = report.queued,
            dropped = report.dropped,
            evicted = report.evicted,
            "Message published"
        );

        report
    }

    /// Stop accepting subscribers and release every queue
    ///
    /// Delivery loops observe their queue closing and end on their own. The
    /// latest-message slot is kept.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let released = state.subscribers.len();
        state.subscribers.clear();

        tracing::info!(released = released, "Hub shut down");
    }

    /// Whether `shutdown` has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Current value of the latest-message slot
    pub fn latest(&self) -> Message {
        self.lock().latest.clone()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Whether the given subscriber is still registered
    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.lock().subscribers.contains_key(&id)
    }

    /// Get hub statistics
    pub fn stats(&self) -> HubStats {
        let subscribers = self.subscriber_count();
        self.counters.snapshot(subscribers, self.created_at.elapsed())
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
