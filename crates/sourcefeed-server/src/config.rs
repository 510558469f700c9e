//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Event stream settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Startup seeding of sample sources.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "sourcefeed_stream=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Event stream configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Spacing between events on one stream, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Idle time after which an SSE keep-alive comment is sent, in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl StreamConfig {
    /// Event spacing as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Keep-alive period as a `Duration`.
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Sample data written on startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Replace the store contents with `names` before serving.
    #[serde(default = "default_seed_enabled")]
    pub enabled: bool,

    /// One source is created per name, each with a fresh id.
    #[serde(default = "default_seed_names")]
    pub names: Vec<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "sourcefeed.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_keep_alive_secs() -> u64 {
    15
}

fn default_seed_enabled() -> bool {
    true
}

fn default_seed_names() -> Vec<String> {
    ["Pressure", "Temperature", "Heat", "Humidity", "Rotation"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_seed_enabled(),
            names: default_seed_names(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SOURCEFEED_HOST` overrides `server.host`
/// - `SOURCEFEED_PORT` overrides `server.port`
/// - `SOURCEFEED_DB_PATH` overrides `database.path`
/// - `SOURCEFEED_LOG_LEVEL` overrides `logging.level`
/// - `SOURCEFEED_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `SOURCEFEED_STREAM_INTERVAL_MS` overrides `stream.interval_ms`
/// - `SOURCEFEED_SEED` overrides `seed.enabled`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if the resulting values are invalid.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(parsed) = var("SOURCEFEED_HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = var("SOURCEFEED_PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }
    if let Some(db_path) = var("SOURCEFEED_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("SOURCEFEED_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("SOURCEFEED_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(parsed) = var("SOURCEFEED_STREAM_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        config.stream.interval_ms = parsed;
    }
    if let Some(seed) = var("SOURCEFEED_SEED") {
        config.seed.enabled = seed == "true" || seed == "1";
    }
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "stream.interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.database.pool_max_size == 0 {
            return Err(ConfigError::Invalid {
                field: "database.pool_max_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
