//! # pushview
//!
//! Push the latest text result to every connected viewer.
//!
//! A producer computes a result when triggered and publishes it to a
//! `BroadcastHub`. Every viewer connected to the `/stream` endpoint has its
//! own bounded queue and delivery loop; slow viewers lose messages instead of
//! holding up the producer, and new viewers immediately see the most recent
//! result.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pushview::{BroadcastHub, HttpServer, ServerConfig};
//!
//! # async fn demo() -> pushview::Result<()> {
//! let hub = Arc::new(BroadcastHub::new());
//! let server = HttpServer::new(ServerConfig::default(), Arc::clone(&hub));
//!
//! hub.publish("hello, viewers");
//! server.run().await
//! # }
//! ```

pub mod delivery;
pub mod error;
pub mod hub;
pub mod producer;
pub mod server;
pub mod stats;

pub use delivery::{ChannelSink, DeliveryLoop, EventKind, EventSink, StreamEvent};
pub use error::{Error, Result};
pub use hub::{BroadcastHub, HubConfig, HubError, Message, SubscriberId, Subscription};
pub use producer::{Pipeline, ProducerConfig, Trigger, TriggerRunner};
pub use server::{HttpServer, ServerConfig};
pub use stats::{DeliveryStats, HubStats, PublishReport};
