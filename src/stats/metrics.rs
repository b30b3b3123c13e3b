//! Statistics for the hub and delivery loops

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::delivery::CloseReason;
use crate::hub::SubscriberId;

/// Outcome of a single publish across the subscriber set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers whose queue accepted the message
    pub queued: usize,
    /// Subscribers whose queue was full (message dropped for them only)
    pub dropped: usize,
    /// Dead subscribers removed during this publish
    pub evicted: usize,
}

impl PublishReport {
    /// Number of subscribers the message was offered to
    pub fn offered(&self) -> usize {
        self.queued + self.dropped + self.evicted
    }
}

/// Lock-free hub counters, updated on every hub operation
#[derive(Debug, Default)]
pub(crate) struct HubCounters {
    published: AtomicU64,
    queued: AtomicU64,
    dropped: AtomicU64,
    evicted: AtomicU64,
    subscribed: AtomicU64,
    unsubscribed: AtomicU64,
    rejected: AtomicU64,
}

impl HubCounters {
    pub(crate) fn record_publish(&self, report: &PublishReport) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_add(report.queued as u64, Ordering::Relaxed);
        self.dropped.fetch_add(report.dropped as u64, Ordering::Relaxed);
        self.evicted.fetch_add(report.evicted as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_subscribe(&self) {
        self.subscribed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unsubscribe(&self) {
        self.unsubscribed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, subscribers: usize, uptime: Duration) -> HubStats {
        HubStats {
            subscribers,
            total_published: self.published.load(Ordering::Relaxed),
            total_queued: self.queued.load(Ordering::Relaxed),
            total_dropped: self.dropped.load(Ordering::Relaxed),
            total_evicted: self.evicted.load(Ordering::Relaxed),
            total_subscribed: self.subscribed.load(Ordering::Relaxed),
            total_unsubscribed: self.unsubscribed.load(Ordering::Relaxed),
            total_rejected: self.rejected.load(Ordering::Relaxed),
            uptime,
        }
    }
}

/// Hub-wide statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct HubStats {
    /// Currently registered subscribers
    pub subscribers: usize,
    /// Total publish calls
    pub total_published: u64,
    /// Total messages accepted into subscriber queues
    pub total_queued: u64,
    /// Total messages dropped because a queue was full
    pub total_dropped: u64,
    /// Total subscribers removed because their queue was dead
    pub total_evicted: u64,
    /// Total successful subscribes
    pub total_subscribed: u64,
    /// Total unsubscribes that removed a subscriber
    pub total_unsubscribed: u64,
    /// Total subscribes refused
    pub total_rejected: u64,
    /// Time since the hub was created
    pub uptime: Duration,
}

impl HubStats {
    /// Fraction of offered messages that were dropped
    pub fn drop_ratio(&self) -> f64 {
        let offered = self.total_queued + self.total_dropped;
        if offered > 0 {
            self.total_dropped as f64 / offered as f64
        } else {
            0.0
        }
    }
}

/// Per-connection delivery statistics
#[derive(Debug, Clone)]
pub struct DeliveryStats {
    /// Subscriber this loop served
    pub subscriber: SubscriberId,
    /// Content events forwarded (including the initial message)
    pub messages_sent: u64,
    /// Keep-alive events forwarded
    pub pings_sent: u64,
    /// Payload bytes forwarded
    pub bytes_sent: u64,
    /// Start time
    pub started_at: Instant,
    /// Why the loop ended (None while still running)
    pub close_reason: Option<CloseReason>,
}

impl DeliveryStats {
    /// Start tracking a loop for the given subscriber
    pub fn new(subscriber: SubscriberId) -> Self {
        Self {
            subscriber,
            messages_sent: 0,
            pings_sent: 0,
            bytes_sent: 0,
            started_at: Instant::now(),
            close_reason: None,
        }
    }

    /// Get duration since the loop started
    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_report_offered() {
        let report = PublishReport {
            queued: 3,
            dropped: 1,
            evicted: 2,
        };
        assert_eq!(report.offered(), 6);
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = HubCounters::default();
        counters.record_subscribe();
        counters.record_subscribe();
        counters.record_unsubscribe();
        counters.record_rejection();
        counters.record_publish(&PublishReport {
            queued: 2,
            dropped: 1,
            evicted: 0,
        });

        let stats = counters.snapshot(1, Duration::from_secs(3));
        assert_eq!(stats.subscribers, 1);
        assert_eq!(stats.total_published, 1);
        assert_eq!(stats.total_queued, 2);
        assert_eq!(stats.total_dropped, 1);
        assert_eq!(stats.total_subscribed, 2);
        assert_eq!(stats.total_unsubscribed, 1);
        assert_eq!(stats.total_rejected, 1);
        assert_eq!(stats.uptime, Duration::from_secs(3));
    }

    #[test]
    fn test_drop_ratio() {
        let mut stats = HubStats::default();
        assert_eq!(stats.drop_ratio(), 0.0);

        stats.total_queued = 3;
        stats.total_dropped = 1;
        assert!((stats.drop_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delivery_stats_new() {
        let stats = DeliveryStats::new(SubscriberId(4));
        assert_eq!(stats.subscriber, SubscriberId(4));
        assert_eq!(stats.messages_sent, 0);
        assert_eq!(stats.pings_sent, 0);
        assert!(stats.close_reason.is_none());
    }
}
