//! Hub error types

/// Error type for hub operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// No room for another subscriber queue
    ResourceExhausted {
        /// Configured subscriber limit
        limit: usize,
    },
    /// The hub has been shut down and accepts no new subscribers
    Closed,
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::ResourceExhausted { limit } => {
                write!(f, "Cannot allocate subscriber queue: limit {} reached", limit)
            }
            HubError::Closed => write!(f, "Hub is shut down"),
        }
    }
}

impl std::error::Error for HubError {}
