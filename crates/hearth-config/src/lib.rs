//! Typed configuration system for Hearth.
//!
//! This crate provides the immutable configuration snapshot every Hearth
//! application is started with:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation of the fixed sections (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`HearthConfig`] struct:
//!
//! - [`ServerConfig`] - listen address, request log toggle, shutdown timeout
//! - [`SessionConfig`] - session cookie name, signing and attributes
//! - [`LoggingConfig`] - log level and output format
//! - `app` - a free-form table for component settings
//!
//! Components never share a mutable configuration: each one receives its own
//! clone during startup.
//!
//! # Example
//!
//! ```no_run
//! use hearth_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hearth_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("hearth.toml")?
//!     .with_env_prefix("HEARTH")
//!     .load()?;
//!
//! println!("Server will listen on: {}", config.server.bind_addr());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! verbose_logs = true
//!
//! [session]
//! cookie_name = "sid"
//! signed = true
//! secret = "keyboard cat"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [app]
//! greeting = "hello"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `HEARTH__SERVER__PORT=9000`
//! - `HEARTH__SESSION__SECRET=keyboard-cat`
//! - `HEARTH__APP__GREETING=hi`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HearthConfig::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_config_builder() {
        let config = HearthConfig::builder()
            .server(ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                ..Default::default()
            })
            .build();

        assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
    }
}
