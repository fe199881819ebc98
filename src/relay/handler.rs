//! One hop of the chain: decode, mutate, pick the next node, forward.

use std::sync::Arc;

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use opentelemetry_sdk::propagation::TextMapCompositePropagator;
use tokio::task::JoinHandle;
use tracing::{field, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::hosts::{HostRotator, NextHop};
use crate::observability::metrics;
use crate::observability::tracing::extract_context;
use crate::relay::envelope::Envelope;
use crate::relay::forwarder::{ForwardOutcome, Forwarder};
use crate::transform::TextTransformer;

/// Errors reported back to the sender of a hop.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Only POST method is accepted")]
    MethodNotAllowed,

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Decode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// What a processed hop did.
#[derive(Debug)]
pub struct HopReport {
    /// Envelope handed to the next hop (or that would have been, on the
    /// last hop).
    pub envelope: Envelope,
    pub next_hop: NextHop,
    /// The detached forward, if one was started.
    pub forward: Option<JoinHandle<ForwardOutcome>>,
}

impl HopReport {
    pub fn is_terminal(&self) -> bool {
        self.next_hop.terminal
    }
}

/// Orchestrates a single hop for this node.
pub struct RelayHandler {
    node_id: String,
    transformer: TextTransformer,
    rotator: HostRotator,
    forwarder: Forwarder,
    propagator: Arc<TextMapCompositePropagator>,
}

impl RelayHandler {
    pub fn new(
        node_id: impl Into<String>,
        transformer: TextTransformer,
        rotator: HostRotator,
        forwarder: Forwarder,
        propagator: Arc<TextMapCompositePropagator>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            transformer,
            rotator,
            forwarder,
            propagator,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    /// Handle one inbound request.
    ///
    /// Only the method and the body decoding can fail. Everything after that
    /// degrades silently: a failed mutation keeps the text, a failed forward
    /// ends the chain here.
    pub async fn handle(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<HopReport, RelayError> {
        if method != Method::POST {
            tracing::warn!(method = %method, "Rejected non-POST message");
            return Err(RelayError::MethodNotAllowed);
        }

        let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(error = %e, "Failed to decode message");
            RelayError::from(e)
        })?;

        let hop = envelope.hop_kind();
        let span = tracing::info_span!(
            "receive-message",
            otel.kind = "server",
            node = %self.node_id,
            hop = hop.as_str(),
            original.message = %envelope.original_text,
            modified.message = field::Empty,
        );
        span.set_parent(extract_context(self.propagator.as_ref(), headers));

        metrics::record_message_received(hop.as_str());
        Ok(self.relay(envelope).instrument(span).await)
    }

    async fn relay(&self, envelope: Envelope) -> HopReport {
        let working = envelope.working_text().to_owned();
        let modified = self.transformer.transform(&working).await;

        Span::current().record("modified.message", modified.as_str());
        tracing::info!(
            before = %working,
            after = %modified,
            changed = modified != working,
            "Message modified"
        );

        let next_hop = self.rotator.next_healthy_host(&self.node_id).await;
        let envelope = envelope.into_next_hop(modified);

        let forward = match next_hop.forward_url() {
            Some(url) => {
                tracing::debug!(next = %next_hop.id, url = %url, "Forwarding message");
                Some(self.forwarder.dispatch(envelope.clone(), url.to_owned()))
            }
            None => {
                tracing::info!(
                    original = %envelope.original_text,
                    result = %envelope.modified_text,
                    "End of the line"
                );
                metrics::record_chain_completed();
                None
            }
        };

        HopReport {
            envelope,
            next_hop,
            forward,
        }
    }
}
