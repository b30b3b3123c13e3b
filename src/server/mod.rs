//! HTTP transport
//!
//! Serves the viewer page and the `/stream` Server-Sent Events endpoint.
//! Each event carries the type `message` (content) or `ping` (keep-alive).

pub mod config;
pub mod listener;
pub mod net;
pub mod page;
pub mod routes;

pub use config::ServerConfig;
pub use listener::HttpServer;
pub use net::local_ip;
pub use routes::{router, AppState};
