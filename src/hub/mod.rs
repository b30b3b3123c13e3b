//! Broadcast hub for live text results
//!
//! The hub owns the set of subscriber queues and the latest-message slot. A
//! producer publishes text; every subscriber queue receives a handle to it; a new
//! subscriber immediately gets whatever was published last.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<BroadcastHub>
//!                     ┌─────────────────────────┐
//!                     │ Mutex<HubState {        │
//!                     │   subscribers: HashMap< │
//!                     │     SubscriberId,       │
//!                     │     QueueSender>,       │
//!                     │   latest: Message,      │
//!                     │ }>                      │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Producer]             [DeliveryLoop]          [DeliveryLoop]
//!    hub.publish()          dequeue_with_timeout()  dequeue_with_timeout()
//!         │                       │                       │
//!         └──► try_enqueue() ─────┴──► sink.send() ──► SSE
//! ```
//!
//! # Backpressure
//!
//! Queues are bounded and publishing never waits. A full queue drops the new
//! message for that subscriber only; the subscriber stays registered and will
//! converge on the next publish or on reconnect. A queue whose receiving half
//! was dropped is treated as dead and removed.

pub mod config;
pub mod error;
pub mod message;
pub mod queue;
pub mod store;

pub use config::HubConfig;
pub use error::HubError;
pub use message::{Message, SubscriberId};
pub use queue::{Dequeued, EnqueueOutcome, QueueReceiver, Subscription};
pub use store::BroadcastHub;
