//! Event loop and listener.
//!
//! The server runs on one thread: a single mio `Poll` reports readiness for
//! the listener and every connection, and each event is handled to
//! completion (or to would-block) before the next wait.

use std::path::Path;

use crate::config::Config;

pub mod listener;

pub use listener::{Server, ShutdownHandle, run};

/// Serves `document_root` on `port` on all interfaces with default settings.
/// Returns only on a fatal error.
pub fn start_server(port: u16, document_root: &Path) -> anyhow::Result<()> {
    let mut cfg = Config::default();
    cfg.server.port = port;
    cfg.static_files.root = document_root.to_path_buf();
    run(&cfg)
}
