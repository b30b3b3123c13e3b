//! Delivery loop state machine
//!
//! Tracks one connection from subscribe to teardown:
//!
//! ```text
//! STARTING ──(initial message forwarded)──► STREAMING
//!     │                                         │
//!     └──────────(any close trigger)────────────┴──► CLOSED
//! ```

use std::fmt;

use super::error::DeliveryError;

/// Delivery loop lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    /// Subscribed, initial message not yet forwarded
    Starting,
    /// Forwarding messages and keep-alives
    Streaming,
    /// Torn down; terminal
    Closed,
}

impl DeliveryPhase {
    /// Move from `Starting` to `Streaming`
    ///
    /// Returns false (and changes nothing) from any other phase.
    pub fn begin_streaming(&mut self) -> bool {
        if *self == DeliveryPhase::Starting {
            *self = DeliveryPhase::Streaming;
            true
        } else {
            false
        }
    }

    /// Move to `Closed`
    ///
    /// Returns true only for the first call, so repeated close triggers
    /// collapse into one teardown.
    pub fn close(&mut self) -> bool {
        if *self == DeliveryPhase::Closed {
            false
        } else {
            *self = DeliveryPhase::Closed;
            true
        }
    }

    /// Check if the loop is closed
    pub fn is_closed(self) -> bool {
        self == DeliveryPhase::Closed
    }
}

/// Why a delivery loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer disconnected
    PeerDisconnected,
    /// Forwarding an event failed or timed out
    ForwardingFailed(DeliveryError),
    /// The hub released the queue (unsubscribe or shutdown)
    QueueClosed,
    /// External cancellation
    Cancelled,
}

impl From<DeliveryError> for CloseReason {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::TransportDisconnected => CloseReason::PeerDisconnected,
            other => CloseReason::ForwardingFailed(other),
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerDisconnected => write!(f, "peer disconnected"),
            CloseReason::ForwardingFailed(e) => write!(f, "{}", e),
            CloseReason::QueueClosed => write!(f, "queue closed by hub"),
            CloseReason::Cancelled => write!(f, "cancelled"),
        }
    }
}
