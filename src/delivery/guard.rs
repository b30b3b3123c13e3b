//! Scoped unsubscribe

use std::sync::Arc;

use crate::hub::{BroadcastHub, SubscriberId};

/// Unsubscribes from the hub exactly once: on `release` or on drop
///
/// A delivery loop owns one of these, so the subscriber is removed on every
/// exit path, including a task abort or a panic.
#[derive(Debug)]
pub struct SubscriptionGuard {
    hub: Arc<BroadcastHub>,
    id: SubscriberId,
    released: bool,
}

impl SubscriptionGuard {
    /// Guard an existing subscription
    pub fn new(hub: Arc<BroadcastHub>, id: SubscriberId) -> Self {
        Self {
            hub,
            id,
            released: false,
        }
    }

    /// Subscriber this guard releases
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Unsubscribe now; later calls are no-ops
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.hub.unsubscribe(self.id);
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_unsubscribes() {
        let hub = Arc::new(BroadcastHub::new());
        let (sub, _) = hub.subscribe().unwrap();

        let guard = SubscriptionGuard::new(Arc::clone(&hub), sub.id());
        assert!(hub.is_subscribed(sub.id()));

        drop(guard);
        assert!(!hub.is_subscribed(sub.id()));
    }

    #[test]
    fn test_release_once() {
        let hub = Arc::new(BroadcastHub::new());
        let (sub, _) = hub.subscribe().unwrap();

        let mut guard = SubscriptionGuard::new(Arc::clone(&hub), sub.id());
        guard.release();
        guard.release();
        drop(guard);

        assert_eq!(hub.stats().total_unsubscribed, 1);
    }
}
