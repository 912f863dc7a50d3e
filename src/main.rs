use std::path::PathBuf;

use anyhow::Context;
use lantern::config::Config;
use lantern::server;

fn main() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    // lantern [port] [document-root]
    let mut args = std::env::args().skip(1);
    if let Some(port) = args.next() {
        cfg.server.port = port
            .parse()
            .with_context(|| format!("invalid port {port:?}"))?;
    }
    if let Some(root) = args.next() {
        cfg.static_files.root = PathBuf::from(root);
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level())
        .init();

    server::run(&cfg)
}
