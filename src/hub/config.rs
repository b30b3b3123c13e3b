//! Hub configuration

use std::time::Duration;

use crate::error::Error;

/// Default per-subscriber mailbox capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// Default idle interval before a keep-alive is sent
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Default bound on a single transport write
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Shortest keep-alive interval a hub will use
pub const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_millis(10);

/// Shortest transport write timeout a hub will use
pub const MIN_SEND_TIMEOUT: Duration = Duration::from_millis(10);

/// Text shown to subscribers before anything has been published
pub const DEFAULT_INITIAL_MESSAGE: &str = "Server started, waiting for a capture…";

/// Broadcast hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Pending messages each subscriber may hold before new ones are dropped
    pub queue_capacity: usize,

    /// Idle time after which a delivery loop emits a ping
    pub keepalive_interval: Duration,

    /// Maximum time a single forward to the transport may take
    pub send_timeout: Duration,

    /// Maximum concurrent subscribers (0 = unlimited)
    pub max_subscribers: usize,

    /// Placeholder held in the latest-message slot until the first publish
    pub initial_message: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            max_subscribers: 0, // Unlimited
            initial_message: DEFAULT_INITIAL_MESSAGE.to_string(),
        }
    }
}

impl HubConfig {
    /// Set the per-subscriber queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the keep-alive interval
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Set the transport write timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set maximum concurrent subscribers
    pub fn max_subscribers(mut self, max: usize) -> Self {
        self.max_subscribers = max;
        self
    }

    /// Set the placeholder message
    pub fn initial_message(mut self, text: impl Into<String>) -> Self {
        self.initial_message = text.into();
        self
    }

    /// Raise out-of-range values to their floor
    ///
    /// `validate` reports the same values as errors; this is what a hub built
    /// from an unvalidated config runs with.
    pub fn clamped(mut self) -> Self {
        self.queue_capacity = self.queue_capacity.max(1);
        self.keepalive_interval = self.keepalive_interval.max(MIN_KEEPALIVE_INTERVAL);
        self.send_timeout = self.send_timeout.max(MIN_SEND_TIMEOUT);
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), Error> {
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".into()));
        }
        if self.keepalive_interval.is_zero() {
            return Err(Error::Config("keepalive_interval must be non-zero".into()));
        }
        if self.send_timeout.is_zero() {
            return Err(Error::Config("send_timeout must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();

        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.keepalive_interval, Duration::from_secs(30));
        assert_eq!(config.max_subscribers, 0);
        assert_eq!(config.initial_message, DEFAULT_INITIAL_MESSAGE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chaining() {
        let config = HubConfig::default()
            .queue_capacity(2)
            .keepalive_interval(Duration::from_secs(5))
            .send_timeout(Duration::from_secs(1))
            .max_subscribers(10)
            .initial_message("ready");

        assert_eq!(config.queue_capacity, 2);
        assert_eq!(config.keepalive_interval, Duration::from_secs(5));
        assert_eq!(config.send_timeout, Duration::from_secs(1));
        assert_eq!(config.max_subscribers, 10);
        assert_eq!(config.initial_message, "ready");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = HubConfig::default().queue_capacity(0).validate();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_keepalive_rejected() {
        let result = HubConfig::default()
            .keepalive_interval(Duration::ZERO)
            .validate();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_clamped_raises_zero_values() {
        let config = HubConfig::default()
            .queue_capacity(0)
            .keepalive_interval(Duration::ZERO)
            .send_timeout(Duration::ZERO)
            .clamped();

        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.keepalive_interval, MIN_KEEPALIVE_INTERVAL);
        assert_eq!(config.send_timeout, MIN_SEND_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamped_keeps_valid_values() {
        let config = HubConfig::default()
            .keepalive_interval(Duration::from_millis(50))
            .clamped();

        assert_eq!(config.keepalive_interval, Duration::from_millis(50));
        assert_eq!(config.send_timeout, DEFAULT_SEND_TIMEOUT);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
