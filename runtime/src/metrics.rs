//! Metrics emitted by the HTTP middleware.
//!
//! The middleware records through the `metrics` facade only; installing an
//! exporter (Prometheus or otherwise) is up to the host application. Call
//! [`describe_metrics`] once after installing the recorder to attach
//! descriptions.

use metrics::{describe_counter, describe_histogram};

/// Requests intercepted and started (`SEND` dispatched).
pub const REQUESTS_SENT: &str = "http_middleware_requests_sent_total";
/// Requests that ended with `SUCCESS`.
pub const REQUESTS_SUCCEEDED: &str = "http_middleware_requests_succeeded_total";
/// Requests that ended with `FAILURE` through the transport.
pub const REQUESTS_FAILED: &str = "http_middleware_requests_failed_total";
/// Requests that were cancelled before settling.
pub const REQUESTS_CANCELLED: &str = "http_middleware_requests_cancelled_total";
/// Actions passed through to `next`.
pub const ACTIONS_PASSED: &str = "http_middleware_actions_passed_total";
/// Time from `SEND` to the terminal lifecycle action.
pub const REQUEST_DURATION: &str = "http_middleware_request_duration_seconds";

/// Register all metric descriptions.
pub fn describe_metrics() {
    describe_counter!(
        REQUESTS_SENT,
        "Total number of request actions intercepted by the middleware"
    );
    describe_counter!(
        REQUESTS_SUCCEEDED,
        "Total number of requests that completed with a 2xx response"
    );
    describe_counter!(
        REQUESTS_FAILED,
        "Total number of requests that failed in the transport or with a non-2xx response"
    );
    describe_counter!(
        REQUESTS_CANCELLED,
        "Total number of requests cancelled before settling"
    );
    describe_counter!(
        ACTIONS_PASSED,
        "Total number of actions passed through to the next middleware"
    );
    describe_histogram!(
        REQUEST_DURATION,
        "Time from dispatching SEND to dispatching the terminal lifecycle action"
    );
}
