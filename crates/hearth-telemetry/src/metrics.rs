//! Request metrics.
//!
//! Recorded through the `metrics` facade; the application installs whichever
//! recorder it wants. Without a recorder the calls are no-ops.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hearth_requests_total` | Counter | `method`, `route`, `status` | Total requests |
//! | `hearth_request_duration_seconds` | Histogram | `method`, `route` | Request latency |
//! | `hearth_validation_failures_total` | Counter | `route` | Requests rejected by a rule |
//! | `hearth_sessions_created_total` | Counter | - | Session ids issued |

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Total requests counter.
pub const REQUESTS_TOTAL: &str = "hearth_requests_total";

/// Request duration histogram.
pub const REQUEST_DURATION_SECONDS: &str = "hearth_request_duration_seconds";

/// Validation failures counter.
pub const VALIDATION_FAILURES_TOTAL: &str = "hearth_validation_failures_total";

/// Sessions created counter.
pub const SESSIONS_CREATED_TOTAL: &str = "hearth_sessions_created_total";

/// Registers descriptions for every metric above.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests processed");
    describe_histogram!(REQUEST_DURATION_SECONDS, "HTTP request duration in seconds");
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Requests rejected by a validation rule"
    );
    describe_counter!(SESSIONS_CREATED_TOTAL, "Session identifiers issued");
}

/// Records a completed request.
pub fn record_request(method: &str, route: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request rejected by validation.
pub fn record_validation_failure(route: &str) {
    counter!(VALIDATION_FAILURES_TOTAL, "route" => route.to_string()).increment(1);
}

/// Records a newly issued session id.
pub fn record_session_created() {
    counter!(SESSIONS_CREATED_TOTAL).increment(1);
}
