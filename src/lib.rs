//! Lantern - static file server
//!
//! Serves files and directory listings from a document root over HTTP/1.1,
//! using a single-threaded, edge-triggered readiness loop.

pub mod config;
pub mod http;
pub mod server;
