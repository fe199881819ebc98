//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context and baggage from incoming requests
//! - Inject the current span's context into outbound forwards
//! - Build the OpenTelemetry tracer behind the `tracing` spans
//!
//! # Design Decisions
//! - W3C `traceparent`/`tracestate` plus `baggage` headers
//! - The propagator is an owned value handed to the relay, not a global
//! - A tracer provider always exists so span ids are real even without an
//!   exporter; OTLP export is added only when an endpoint is configured

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry::{global, Context, KeyValue};
use opentelemetry_sdk::propagation::{
    BaggagePropagator, TextMapCompositePropagator, TraceContextPropagator,
};
use opentelemetry_sdk::trace::{Config, Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};

use crate::config::ObservabilityConfig;

/// Trace-context plus baggage propagation.
pub fn propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

/// Read-only view of request headers for propagation.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Writable view of outbound headers for propagation.
pub struct HeaderInjector<'a>(pub &'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

pub fn extract_context(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Context {
    propagator.extract(&HeaderExtractor(headers))
}

pub fn inject_context(propagator: &dyn TextMapPropagator, cx: &Context, headers: &mut HeaderMap) {
    propagator.inject_context(cx, &mut HeaderInjector(headers));
}

fn resource(service_name: &str) -> Resource {
    Resource::new(vec![KeyValue::new("service.name", service_name.to_owned())])
}

/// In-process provider with no exporter.
///
/// The returned provider must be kept alive for as long as its tracers
/// are in use.
pub fn local_provider(service_name: &str) -> TracerProvider {
    TracerProvider::builder()
        .with_config(Config::default().with_resource(resource(service_name)))
        .build()
}

/// Build the tracer for the `tracing-opentelemetry` layer and register its
/// provider globally.
pub fn build_tracer(config: &ObservabilityConfig) -> Result<Tracer, TraceError> {
    match config.otlp_endpoint.as_deref().filter(|e| !e.is_empty()) {
        Some(endpoint) => {
            use opentelemetry_otlp::WithExportConfig;

            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(
                    Config::default().with_resource(resource(&config.service_name)),
                )
                .install_batch(runtime::Tokio)
        }
        None => {
            let provider = local_provider(&config.service_name);
            let tracer = provider.tracer(config.service_name.clone());
            global::set_tracer_provider(provider);
            Ok(tracer)
        }
    }
}

/// Flush pending spans and drop the global provider.
pub fn shutdown() {
    global::shutdown_tracer_provider();
}
