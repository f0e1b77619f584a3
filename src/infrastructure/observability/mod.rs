//! Push-based observability for Trendcast
//!
//! Observability goes through **outbound data only**: Prometheus metrics held
//! in-process and a periodic JSON snapshot on stdout. There is no HTTP server.

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
