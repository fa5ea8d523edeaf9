//! Logger module
//!
//! Provides logging utilities for the portal server including:
//! - The injectable [`Logger`] capability used by action handlers
//! - Server lifecycle and access logging
//! - File-based logging support

pub mod writer;

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;

/// Logging capability injected into action handlers.
///
/// Used for audit-trail side effects only, never for control flow.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Severity levels, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Whether a writer configured at `self` emits messages at `level`
    #[must_use]
    pub fn enables(self, level: Self) -> bool {
        level <= self
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// [`Logger`] backed by the global log writer
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerLogger;

impl Logger for ServerLogger {
    fn info(&self, message: &str) {
        write(LogLevel::Info, &format!("[INFO] {message}"));
    }

    fn warn(&self, message: &str) {
        write(LogLevel::Warn, &format!("[WARN] {message}"));
    }

    fn error(&self, message: &str) {
        write(LogLevel::Error, &format!("[ERROR] {message}"));
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup. An unknown level falls
/// back to `info` with a warning.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, using 'info'");
        LogLevel::Info
    });
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level <= LogLevel::Warn => eprintln!("{message}"),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write(LogLevel::Info, "======================================");
    write(LogLevel::Info, "Portal server started");
    write(LogLevel::Info, &format!("Listening on: http://{addr}"));
    write(LogLevel::Info, &format!("Site base URL: {}", config.site.base_url));
    write(LogLevel::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write(LogLevel::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(LogLevel::Info, &format!("Error log: {path}"));
    }
    write(LogLevel::Info, "======================================");
}

pub fn log_shutdown() {
    write(LogLevel::Info, "[Shutdown] Stopped accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(LogLevel::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(LogLevel::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log one access line: `peer "METHOD /path" status elapsed`
pub fn log_access(peer: &SocketAddr, method: &str, path: &str, status: u16, elapsed: Duration) {
    let line = format_access(peer, method, path, status, elapsed);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

fn format_access(
    peer: &SocketAddr,
    method: &str,
    path: &str,
    status: u16,
    elapsed: Duration,
) -> String {
    #[allow(clippy::cast_precision_loss)]
    let millis = elapsed.as_micros() as f64 / 1000.0;
    format!("{} \"{method} {path}\" {status} {millis:.3}ms", peer.ip())
}

#[cfg(test)]
pub mod testing {
    use super::Logger;
    use std::sync::Mutex;

    /// Logger double keeping every line as `LEVEL message`
    #[derive(Default)]
    pub struct RecordingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        pub fn lines(&self) -> Vec<String> {
            let guard = self.lines.lock().unwrap();
            let lines = guard.clone();
            drop(guard);
            lines
        }

        fn push(&self, level: &str, message: &str) {
            self.lines.lock().unwrap().push(format!("{level} {message}"));
        }
    }

    impl Logger for RecordingLogger {
        fn info(&self, message: &str) {
            self.push("INFO", message);
        }

        fn warn(&self, message: &str) {
            self.push("WARN", message);
        }

        fn error(&self, message: &str) {
            self.push("ERROR", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("error".parse(), Ok(LogLevel::Error));
        assert_eq!("WARN".parse(), Ok(LogLevel::Warn));
        assert_eq!("warning".parse(), Ok(LogLevel::Warn));
        assert_eq!("info".parse(), Ok(LogLevel::Info));
        assert_eq!("trace".parse(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_filtering() {
        assert!(LogLevel::Info.enables(LogLevel::Error));
        assert!(LogLevel::Info.enables(LogLevel::Info));
        assert!(!LogLevel::Info.enables(LogLevel::Debug));
        assert!(!LogLevel::Error.enables(LogLevel::Warn));
        assert!(LogLevel::Debug.enables(LogLevel::Debug));
    }

    #[test]
    fn test_format_access() {
        let peer: SocketAddr = "10.0.0.7:51234".parse().unwrap();
        let line = format_access(&peer, "POST", "/api/login", 400, Duration::from_micros(1500));
        assert_eq!(line, "10.0.0.7 \"POST /api/login\" 400 1.500ms");
    }
}
