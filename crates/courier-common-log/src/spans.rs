//! Span helpers for requests and bodies.

use std::time::Instant;
use tracing::{debug_span, info_span, Span};

/// Span covering one request to `url`.
pub fn request_span(method: &str, url: &str) -> Span {
    info_span!("request", method = %method, url = %url, status = tracing::field::Empty)
}

/// Span covering the encoding or decoding of a body.
pub fn body_span(kind: &str) -> Span {
    debug_span!("body", kind = %kind, bytes = tracing::field::Empty)
}

/// Record a response status on a request span.
pub fn record_status(span: &Span, status: u16) {
    span.record("status", status);
}

/// Log an error against the current span.
pub fn record_error(error: &dyn std::error::Error) {
    tracing::error!(error = %error, "operation failed");
}

/// Measures how long an operation takes.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing `operation`.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Log the elapsed time and return it in milliseconds.
    pub fn finish(self) -> u128 {
        let elapsed = self.start.elapsed().as_millis();
        tracing::debug!(operation = %self.operation, duration_ms = %elapsed, "operation completed");
        elapsed
    }
}

/// Time a block and log its duration.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
