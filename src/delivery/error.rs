//! Delivery error types

use std::time::Duration;

/// Error type for forwarding events to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The peer went away
    TransportDisconnected,
    /// The transport refused the event
    ForwardingFailed(String),
    /// The transport did not accept the event in time
    SendTimeout(Duration),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::TransportDisconnected => write!(f, "Transport disconnected"),
            DeliveryError::ForwardingFailed(reason) => write!(f, "Forwarding failed: {}", reason),
            DeliveryError::SendTimeout(timeout) => {
                write!(f, "Send timed out after {} ms", timeout.as_millis())
            }
        }
    }
}

impl std::error::Error for DeliveryError {}
