//! Events forwarded to a transport connection

use crate::hub::Message;

/// Payload of every keep-alive event
pub const PING_DATA: &str = "keep-alive";

/// Type of stream event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Real content
    Message,
    /// Keep-alive, no content
    Ping,
}

impl EventKind {
    /// Event name on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Ping => "ping",
        }
    }
}

/// One event delivered to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Type of event
    pub kind: EventKind,
    /// Event payload
    pub data: Message,
}

impl StreamEvent {
    /// Create a content event
    pub fn message(data: Message) -> Self {
        Self {
            kind: EventKind::Message,
            data,
        }
    }

    /// Create a keep-alive event
    pub fn ping() -> Self {
        Self {
            kind: EventKind::Ping,
            data: Message::from(PING_DATA),
        }
    }

    /// Whether this is a keep-alive
    pub fn is_ping(&self) -> bool {
        self.kind == EventKind::Ping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::Message.as_str(), "message");
        assert_eq!(EventKind::Ping.as_str(), "ping");
    }

    #[test]
    fn test_ping_event() {
        let ping = StreamEvent::ping();
        assert!(ping.is_ping());
        assert_eq!(ping.data.as_str(), "keep-alive");

        let msg = StreamEvent::message(Message::from("x"));
        assert!(!msg.is_ping());
    }
}
