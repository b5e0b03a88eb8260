//! Configuration types for Parley.
//!
//! `AppConfig` mirrors the `config.toml` layout: `[log]`, `[sqlite]` and
//! `[server]` tables. Every field has a default, so an empty file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Special SQLite path that keeps the whole database in memory.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Top-level configuration, passed explicitly to the components that need it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub sqlite: SqliteConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `"stderr"` or a file path to append to.
    #[serde(default = "default_log_path")]
    pub path: String,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Export spans through the OpenTelemetry stdout exporter.
    #[serde(default)]
    pub otel: bool,
}

fn default_log_path() -> String {
    "stderr".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            filter: default_log_filter(),
            otel: false,
        }
    }
}

impl LogConfig {
    pub fn is_stderr(&self) -> bool {
        self.path == "stderr"
    }
}

/// SQLite database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:`.
    #[serde(default = "default_sqlite_path")]
    pub path: String,
    /// Connections in the read-only reader pool.
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_sqlite_path() -> String {
    IN_MEMORY_PATH.to_string()
}

fn default_max_readers() -> u32 {
    8
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
            max_readers: default_max_readers(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl SqliteConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a single request's storage work.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
