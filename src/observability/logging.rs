//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Bridge spans into OpenTelemetry
//! - Choose pretty or JSON output
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - The level filters log output only; span export has its own filter
//! - JSON format for production, pretty format for development

use opentelemetry::trace::TraceError;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to build tracer: {0}")]
    Tracer(#[from] TraceError),

    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Default filter directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("telephone={level},tower_http={level}")
}

/// Spans exported to OpenTelemetry, independent of the log level.
///
/// Outbound propagation headers are injected from the current span, so the
/// relay spans must stay enabled even when logs are quiet.
pub fn trace_targets() -> Targets {
    Targets::new().with_target("telephone", Level::INFO)
}

fn log_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)))
}

/// Install logging and tracing for the process. Call once, inside the
/// Tokio runtime.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<(), TelemetryError> {
    let tracer = super::tracing::build_tracer(config)?;
    let otel = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(trace_targets());

    let json = config.json_logs.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(log_filter(config))
    });
    let pretty = (!config.json_logs)
        .then(|| fmt::layer().with_target(true).with_filter(log_filter(config)));

    tracing_subscriber::registry()
        .with(otel)
        .with(json)
        .with(pretty)
        .try_init()?;

    Ok(())
}
