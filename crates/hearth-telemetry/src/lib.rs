//! Observability for Hearth.
//!
//! - **Logging**: a `tracing-subscriber` stack configured from
//!   [`LoggingConfig`](hearth_config::LoggingConfig), in JSON, pretty or
//!   compact form
//! - **Metrics**: request counters and latency histograms through the
//!   `metrics` facade
//!
//! # Example
//!
//! ```rust,no_run
//! use hearth_config::HearthConfig;
//! use hearth_telemetry::{init_logging, LogConfig};
//!
//! let config = HearthConfig::production();
//! init_logging(&LogConfig::from(&config.logging)).expect("logging");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
