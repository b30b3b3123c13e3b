//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default number of events buffered between a delivery loop and its response body
pub const DEFAULT_SINK_BUFFER: usize = 8;

/// HTTP server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Events buffered per connection between the delivery loop and the
    /// response body
    pub sink_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            sink_buffer: DEFAULT_SINK_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the per-connection event buffer (minimum 1)
    pub fn sink_buffer(mut self, buffer: usize) -> Self {
        self.sink_buffer = buffer.max(1);
        self
    }
}
