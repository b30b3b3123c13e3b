//! Crate-wide error types
//!
//! Each subsystem has its own error enum; `Error` wraps them for callers that
//! drive the whole service (the binary, the HTTP listener).

use std::fmt;
use std::io;

use crate::delivery::DeliveryError;
use crate::hub::HubError;
use crate::producer::ProduceError;

/// Result alias used by the server and binary
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Socket or filesystem failure
    Io(io::Error),
    /// Broadcast hub rejected an operation
    Hub(HubError),
    /// A delivery loop could not forward an event
    Delivery(DeliveryError),
    /// The producer failed to compute a result
    Produce(ProduceError),
    /// Invalid configuration value
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Hub(e) => write!(f, "Hub error: {}", e),
            Error::Delivery(e) => write!(f, "Delivery error: {}", e),
            Error::Produce(e) => write!(f, "Producer error: {}", e),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Hub(e) => Some(e),
            Error::Delivery(e) => Some(e),
            Error::Produce(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HubError> for Error {
    fn from(e: HubError) -> Self {
        Error::Hub(e)
    }
}

impl From<DeliveryError> for Error {
    fn from(e: DeliveryError) -> Self {
        Error::Delivery(e)
    }
}

impl From<ProduceError> for Error {
    fn from(e: ProduceError) -> Self {
        Error::Produce(e)
    }
}
