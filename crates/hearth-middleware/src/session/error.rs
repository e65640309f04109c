//! Session error types.

use thiserror::Error;

use super::SessionEvent;

/// Errors raised while configuring sessions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A handler is already registered for the event.
    #[error("a handler for session event '{event}' is already registered")]
    AlreadyRegistered {
        /// The event.
        event: SessionEvent,
    },

    /// The handler's kind does not match the event.
    #[error("handler for '{handler}' cannot be registered on '{event}'")]
    HandlerMismatch {
        /// The event being registered.
        event: SessionEvent,
        /// The event the handler was built for.
        handler: SessionEvent,
    },

    /// Signed cookies were requested without a secret.
    #[error("signed session cookies require a non-empty secret")]
    MissingSecret,
}
