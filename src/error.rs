//! Startup error types
//!
//! Request-level failures never reach this type; they are answered with an
//! [`ApiResponse`](crate::api::ApiResponse) instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid listen address {0}")]
    Address(String),

    #[error("Failed to open log files: {0}")]
    Logger(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
