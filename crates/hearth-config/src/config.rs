//! Main configuration types.
//!
//! This module provides the top-level [`HearthConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ConfigError, LogFormat, LoggingConfig, ServerConfig, SessionConfig};

/// Complete Hearth configuration.
///
/// This is the root configuration type. Once loaded it is treated as
/// immutable: every component that asks for configuration receives its own
/// deep copy (`Clone`), so no component can alter what another one sees.
///
/// The `app` table is free-form and carries component-specific keys.
///
/// # Example
///
/// ```
/// use hearth_config::HearthConfig;
///
/// let config = HearthConfig::default();
/// assert_eq!(config.server.port, 8080);
/// assert!(config.app.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HearthConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Application-defined settings.
    #[serde(default)]
    pub app: Map<String, Value>,
}

impl HearthConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use hearth_config::{HearthConfig, ServerConfig};
    ///
    /// let config = HearthConfig::builder()
    ///     .server(ServerConfig {
    ///         port: 3000,
    ///         ..Default::default()
    ///     })
    ///     .app_value("greeting", "hello")
    ///     .build();
    ///
    /// assert_eq!(config.server.port, 3000);
    /// assert_eq!(config.app_str("greeting"), Some("hello"));
    /// ```
    #[must_use]
    pub fn builder() -> HearthConfigBuilder {
        HearthConfigBuilder::new()
    }

    /// Returns an application setting.
    #[must_use]
    pub fn app_value(&self, key: &str) -> Option<&Value> {
        self.app.get(key)
    }

    /// Returns an application setting as a string slice.
    #[must_use]
    pub fn app_str(&self, key: &str) -> Option<&str> {
        self.app.get(key).and_then(Value::as_str)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The port is zero
    /// - The host is empty
    /// - Signed sessions are enabled without a secret
    /// - The session cookie name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid_value(
                "server.port",
                "must be between 1 and 65535",
            ));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid_value("server.host", "must not be empty"));
        }

        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "session.cookie_name",
                "must not be empty",
            ));
        }

        if self.session.signed
            && self
                .session
                .secret
                .as_deref()
                .map_or(true, |s| s.is_empty())
        {
            return Err(ConfigError::invalid_value(
                "session.secret",
                "a secret is required when session.signed is true",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs and a request log on every route.
    ///
    /// # Example
    ///
    /// ```
    /// use hearth_config::HearthConfig;
    ///
    /// let config = HearthConfig::development();
    /// assert!(config.server.verbose_logs);
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.server.verbose_logs = true;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level and `Secure` session cookies.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.session.secure = true;

        config
    }
}

/// Builder for [`HearthConfig`].
#[derive(Debug, Default)]
pub struct HearthConfigBuilder {
    config: HearthConfig,
}

impl HearthConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Set the session configuration.
    #[must_use]
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set one application setting.
    #[must_use]
    pub fn app_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.app.insert(key.into(), value.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> HearthConfig {
        self.config
    }
}
