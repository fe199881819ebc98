//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (subscriber: filter, fmt or JSON, OpenTelemetry bridge)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing.rs (trace context in and out of HTTP headers)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (optional)
//!     → OTLP collector (optional)
//! ```
//!
//! # Design Decisions
//! - One trace spans the whole chain: every hop extracts, every forward injects
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use logging::{init_telemetry, TelemetryError};
