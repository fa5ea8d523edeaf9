// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`
    pub level: String,
    pub access_log: bool,
    /// Access log file path (stdout when unset)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (stderr when unset)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// HTTP protocol configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Connection performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on a connection's lifetime, in seconds
    pub read_timeout: u64,
}

/// Site configuration shared by the actions
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Absolute base URL, always ending with `/`
    pub base_url: String,
}
