//! WebEngine - embeddable HTTP/1.1 server
//!
//! Core library: connection acceptance and worker dispatch, the HTTP wire
//! protocol, and path-based resource routing.

pub mod config;
pub mod http;
pub mod log;
pub mod server;
