//! Per-connection delivery
//!
//! One `DeliveryLoop` runs per connected client. It drains that client's
//! subscriber queue into an `EventSink`, sends a ping whenever the queue stays
//! idle for the keep-alive interval, and unsubscribes on the way out no matter
//! how it ends.
//!
//! Loops share nothing but the hub; a failing loop never touches another
//! subscriber.

pub mod error;
pub mod event;
pub mod guard;
pub mod sink;
pub mod state;
pub mod task;

pub use error::DeliveryError;
pub use event::{EventKind, StreamEvent, PING_DATA};
pub use guard::SubscriptionGuard;
pub use sink::{ChannelSink, EventSink};
pub use state::{CloseReason, DeliveryPhase};
pub use task::DeliveryLoop;
