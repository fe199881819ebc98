//! Best-effort delivery of an envelope to the next hop.
//!
//! Forwards run as detached tasks: the inbound request never waits for
//! them and never learns their outcome. There is no retry and no limit on
//! how many forwards may be in flight at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use opentelemetry_sdk::propagation::TextMapCompositePropagator;
use tokio::task::JoinHandle;
use tracing::{field, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::ForwardConfig;
use crate::observability::metrics;
use crate::observability::tracing::inject_context;
use crate::relay::envelope::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("forward to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// What happened to a single forward attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The next hop answered. Any status counts; it is only recorded.
    Delivered { status: StatusCode },
    /// Nothing was delivered.
    Failed { reason: String },
}

impl ForwardOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ForwardOutcome::Delivered { .. })
    }
}

/// Posts envelopes to other nodes, carrying the current trace context.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    propagator: Arc<TextMapCompositePropagator>,
    in_flight: Arc<AtomicUsize>,
}

impl Forwarder {
    pub fn new(
        config: &ForwardConfig,
        propagator: Arc<TextMapCompositePropagator>,
    ) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            propagator,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Forwards started but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Start a detached forward. The handle may be dropped; the task keeps
    /// running to completion either way.
    pub fn dispatch(&self, envelope: Envelope, url: String) -> JoinHandle<ForwardOutcome> {
        let guard = InFlightGuard::acquire(&self.in_flight);
        let span = tracing::info_span!(
            "forward-message",
            otel.kind = "client",
            url = %url,
            http.status_code = field::Empty,
            otel.status_code = field::Empty,
        );

        let forwarder = self.clone();
        tokio::spawn(
            async move {
                let _guard = guard;
                forwarder.forward(&envelope, &url).await
            }
            .instrument(span),
        )
    }

    /// Post `envelope` to `url` and wait for the answer. Failures are
    /// logged and returned as an outcome, never as an error.
    pub async fn forward(&self, envelope: &Envelope, url: &str) -> ForwardOutcome {
        match self.send(envelope, url).await {
            Ok(status) => {
                Span::current().record("http.status_code", status.as_u16());
                tracing::info!(url = %url, status = %status, "Message forwarded");
                metrics::record_forward("delivered");
                ForwardOutcome::Delivered { status }
            }
            Err(e) => {
                Span::current().record("otel.status_code", "ERROR");
                tracing::error!(url = %url, error = %e, "Failed to forward message");
                metrics::record_forward("failed");
                ForwardOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn send(&self, envelope: &Envelope, url: &str) -> Result<StatusCode, ForwardError> {
        let body = serde_json::to_vec(envelope)?;

        let mut headers = HeaderMap::new();
        inject_context(self.propagator.as_ref(), &Span::current().context(), &mut headers);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|source| ForwardError::Request {
                url: url.to_owned(),
                source,
            })?;

        Ok(response.status())
    }
}

/// Counts a forward as in flight until dropped.
struct InFlightGuard {
    count: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn acquire(count: &Arc<AtomicUsize>) -> Self {
        let now = count.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::set_forwards_in_flight(now);
        Self {
            count: count.clone(),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let now = self.count.fetch_sub(1, Ordering::Relaxed) - 1;
        metrics::set_forwards_in_flight(now);
    }
}
