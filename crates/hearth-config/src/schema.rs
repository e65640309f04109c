//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// Controls where the HTTP binder listens and how verbose the per-route
/// request log is.
///
/// # Example
///
/// ```
/// use hearth_config::ServerConfig;
///
/// let config = ServerConfig {
///     host: "127.0.0.1".to_string(),
///     port: 3000,
///     verbose_logs: true,
///     shutdown_timeout_secs: 10,
/// };
/// assert_eq!(config.bind_addr(), "127.0.0.1:3000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Mount a request-log step in front of every route.
    #[serde(default)]
    pub verbose_logs: bool,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            verbose_logs: false,
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Session cookie configuration.
///
/// The session id travels in a cookie. When `signed` is set, the cookie value
/// is `s:<id>.<signature>` and `secret` keys the signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Sign the cookie value.
    #[serde(default)]
    pub signed: bool,

    /// Signing secret. Required when `signed` is true.
    #[serde(default)]
    pub secret: Option<String>,

    /// Set the `HttpOnly` attribute.
    #[serde(default = "default_true")]
    pub http_only: bool,

    /// Set the `Secure` attribute.
    #[serde(default)]
    pub secure: bool,

    /// Cookie `Path` attribute.
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Cookie `Max-Age` in seconds. `None` yields a browser-session cookie.
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            signed: false,
            secret: None,
            http_only: true,
            secure: false,
            path: default_cookie_path(),
            max_age_secs: None,
        }
    }
}

fn default_cookie_name() -> String {
    "sid".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    Json,
    /// Human-readable pretty format (development).
    Pretty,
    /// Single-line human-readable format.
    #[default]
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (e.g., "info", "hearth_server=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
