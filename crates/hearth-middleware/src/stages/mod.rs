//! Built-in route stages.
//!
//! The route installer assembles each route's chain from these:
//!
//! | Stage | Added when | Purpose |
//! |-------|------------|---------|
//! | [`RequestLogMiddleware`] | `server.verbose_logs` is on | one log event and metrics per request |
//! | [`ValidationMiddleware`] | the route declares rules | reject requests that fail a rule |

pub mod request_log;
pub mod validation;

pub use request_log::RequestLogMiddleware;
pub use validation::ValidationMiddleware;
