//! Timetabler Observability
//!
//! Provides configurable observability features including:
//! - Tracing and distributed tracing via OpenTelemetry
//! - Metrics collection via Prometheus, including timetable business counters
//! - HTTP request/response logging
//!
//! The `observability` feature (default) compiles everything in. At runtime,
//! `OBSERVABILITY_ENABLED=false` falls back to console logging only and turns
//! metrics into no-ops. Without the feature the same API is provided by no-op
//! stubs plus console logging.
//!
//! # Examples
//!
//! ```no_run
//! use timetabler_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_app, metrics_middleware,
    track_conflicts_detected, track_entry_created, track_entry_transition, track_generation_run,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Console logging only.
    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    pub fn init_metrics() -> Option<()> {
        None
    }

    pub fn metrics_app(_handle: ()) -> axum::Router {
        axum::Router::new()
    }

    pub fn track_entry_created(_source: &str) {}
    pub fn track_conflicts_detected(_conflict_type: &str, _count: usize) {}
    pub fn track_generation_run(_created: usize, _shortfalls: usize) {}
    pub fn track_entry_transition(_status: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
