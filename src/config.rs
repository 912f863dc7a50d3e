use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "LANTERN_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Longest accepted request line in bytes.
    pub max_request_line: usize,
    /// Seconds without I/O before a connection is dropped; 0 disables.
    pub idle_timeout_secs: u64,
    /// Readiness events fetched per wait.
    pub max_events: usize,
    /// Request lines a connection may queue while a response is in flight.
    pub max_pipelined: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    /// Page served with 404 responses, relative to the root.
    pub not_found_page: PathBuf,
    pub chunk_size: usize,
    /// Delay between body chunks in microseconds; 0 disables.
    pub pacing_micros: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            max_request_line: 4096,
            idle_timeout_secs: 60,
            max_events: 1024,
            max_pipelined: 32,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            not_found_page: PathBuf::from("404.html"),
            chunk_size: 1024,
            pacing_micros: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the file named by `LANTERN_CONFIG` (or the defaults), then
    /// applies `LANTERN_PORT`, `LANTERN_ROOT` and `LANTERN_LOG`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies overrides looked up by variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("LANTERN_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid LANTERN_PORT {port:?}"))?;
        }
        if let Some(root) = lookup("LANTERN_ROOT") {
            self.static_files.root = PathBuf::from(root);
        }
        if let Some(level) = lookup("LANTERN_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind, self.server.port)
    }

    /// Maximum log level; unknown names fall back to `INFO`.
    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

impl StaticFilesConfig {
    pub fn pacing(&self) -> Option<Duration> {
        (self.pacing_micros > 0).then(|| Duration::from_micros(self.pacing_micros))
    }
}
