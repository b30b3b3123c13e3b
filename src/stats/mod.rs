//! Counters and snapshots for the hub and delivery loops

pub mod metrics;

pub use metrics::{DeliveryStats, HubStats, PublishReport};
pub(crate) use metrics::HubCounters;
