//! Error types for Hearth.
//!
//! This module provides the [`HearthError`] type raised while handling a
//! request, and the [`StartupError`] type raised while assembling an
//! application.
//!
//! Every request-time error renders to the same wire payload, the
//! [`ErrorEnvelope`]:
//!
//! ```json
//! { "error": true, "message": "Invalid header \"x\" on headers!", "code": "VALIDATION_FAILED" }
//! ```
//!
//! Statuses differ by category (400 for validation, 404 for an unmatched
//! route or a missing resource, 500 for anything uncaught). Only the route
//! table's not-found responder uses `ROUTE_NOT_FOUND`; other errors default
//! to `UNKNOWN_ERROR` unless they name a code. Internal errors never leak their detail
//! into the payload.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`HearthError`].
pub type HearthResult<T> = Result<T, HearthError>;

/// Code used when the raising site does not name one.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Code for a failed validation rule.
pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";

/// Code for a request that matched no mounted route.
pub const ROUTE_NOT_FOUND: &str = "ROUTE_NOT_FOUND";

/// Code for a request body that claims to be JSON but does not parse.
pub const INVALID_JSON_BODY: &str = "INVALID_JSON_BODY";

/// Message sent to clients for every internal failure.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A declared validation rule failed.
    Validation,
    /// The request could not be decoded.
    BadRequest,
    /// No route matched.
    NotFound,
    /// A handler chose an explicit status.
    Http,
    /// Anything uncaught.
    Internal,
}

/// Standard request-time error type for Hearth.
///
/// Handlers return `HearthResult<Response>`. Errors a handler raises
/// deliberately (`validation`, `not_found`, `http`) are rendered as-is;
/// everything else becomes a generic 500.
///
/// # Example
///
/// ```
/// use hearth_core::HearthError;
/// use http::StatusCode;
///
/// let err = HearthError::http(StatusCode::CONFLICT, "Album already exists")
///     .with_code("ALBUM_EXISTS");
///
/// let envelope = err.to_envelope();
/// assert!(envelope.error);
/// assert_eq!(envelope.code, "ALBUM_EXISTS");
/// assert_eq!(err.status_code(), StatusCode::CONFLICT);
/// ```
#[derive(Error, Debug)]
pub enum HearthError {
    /// A validation rule rejected the request.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// The request body could not be decoded.
    #[error("{message}")]
    InvalidBody {
        /// Human-readable error message.
        message: String,
    },

    /// No route matched the request, or a handler found nothing to serve.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// Machine-readable code, `UNKNOWN_ERROR` when absent.
        code: Option<String>,
    },

    /// An error with a handler-chosen status and code.
    #[error("{message}")]
    Http {
        /// Response status.
        status: StatusCode,
        /// Human-readable error message.
        message: String,
        /// Machine-readable code, `UNKNOWN_ERROR` when absent.
        code: Option<String>,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Operator-facing error message (not exposed to clients).
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HearthError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an invalid body error.
    #[must_use]
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody {
            message: message.into(),
        }
    }

    /// Creates a not found error raised by a handler.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: None,
        }
    }

    /// Creates the error for a request that matched no mounted route.
    #[must_use]
    pub fn route_not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: Some(ROUTE_NOT_FOUND.to_string()),
        }
    }

    /// Creates an error with an explicit status.
    #[must_use]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a machine-readable code to an [`HearthError::Http`] or
    /// [`HearthError::NotFound`] error.
    ///
    /// Other variants carry a fixed code and are returned unchanged.
    #[must_use]
    pub fn with_code(self, code: impl Into<String>) -> Self {
        match self {
            Self::Http {
                status, message, ..
            } => Self::Http {
                status,
                message,
                code: Some(code.into()),
            },
            Self::NotFound { message, .. } => Self::NotFound {
                message,
                code: Some(code.into()),
            },
            other => other,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::InvalidBody { .. } => ErrorCategory::BadRequest,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Http { .. } => ErrorCategory::Http,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Http { status, .. } => *status,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Validation { .. } => VALIDATION_FAILED,
            Self::InvalidBody { .. } => INVALID_JSON_BODY,
            Self::NotFound { code, .. } | Self::Http { code, .. } => {
                code.as_deref().unwrap_or(UNKNOWN_ERROR)
            }
            Self::Internal { .. } => UNKNOWN_ERROR,
        }
    }

    /// Returns `true` for errors whose detail must stay out of responses.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Converts this error to the wire payload.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let message = if self.is_internal() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        ErrorEnvelope::new(message, self.code())
    }
}

impl From<anyhow::Error> for HearthError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_with_source("unhandled error", err)
    }
}

/// Serializable error payload shared by every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `true`.
    pub error: bool,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code.
    #[serde(default = "default_code")]
    pub code: String,
}

impl ErrorEnvelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            code: code.into(),
        }
    }
}

fn default_code() -> String {
    UNKNOWN_ERROR.to_string()
}

/// Phase of the injection protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionPhase {
    /// Service map injection.
    Services,
    /// Configuration injection.
    Config,
}

impl std::fmt::Display for InjectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Services => f.write_str("service injection"),
            Self::Config => f.write_str("config injection"),
        }
    }
}

/// Fatal errors raised while assembling an application.
#[derive(Error, Debug)]
pub enum StartupError {
    /// A component hook failed.
    #[error("{phase} failed for component '{component}'")]
    Injection {
        /// Component whose hook failed.
        component: String,
        /// Phase the hook ran in.
        phase: InjectionPhase,
        /// The hook's error.
        #[source]
        source: anyhow::Error,
    },

    /// The configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] hearth_config::ConfigError),
}

impl StartupError {
    /// Creates an injection error.
    pub fn injection(
        component: impl Into<String>,
        phase: InjectionPhase,
        source: anyhow::Error,
    ) -> Self {
        Self::Injection {
            component: component.into(),
            phase,
            source,
        }
    }
}
