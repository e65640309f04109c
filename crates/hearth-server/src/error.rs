//! Server error types.

use std::io;

use hearth_config::ConfigError;
use hearth_core::StartupError;
use hearth_middleware::SessionError;
use thiserror::Error;

/// Errors that stop an application from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Discovery, injection or configuration failed.
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// The session manager could not be built.
    #[error("session setup failed: {0}")]
    Session(#[from] SessionError),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// The I/O error.
        #[source]
        source: io::Error,
    },
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        Self::Startup(StartupError::Config(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_startup_error() {
        let err = ServerError::from(ConfigError::invalid_value("server.port", "must not be 0"));
        assert!(matches!(err, ServerError::Startup(StartupError::Config(_))));
    }

    #[test]
    fn test_bind_error_display() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:1".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:1: in use");
    }
}
