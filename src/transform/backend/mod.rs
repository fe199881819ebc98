//! Text generation backends.
//!
//! # Responsibilities
//! - Turn a prompt into a short completion
//! - Record each call as its own span (prompt, response, errors)
//!
//! # Design Decisions
//! - One backend is selected at startup and shared read-only
//! - Every failure is an error value; callers decide how to degrade
//! - A completion that is empty after trimming counts as malformed

pub mod gemini;
pub mod ollama;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::Span;

use crate::config::{BackendKind, TransformConfig};
use crate::observability::metrics;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("missing GOOGLE_API_KEY or GEMINI_API_KEY")]
    MissingCredential,

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// A text completion service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs, spans and metrics.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Build the configured backend.
pub fn build_backend(config: &TransformConfig) -> Result<Arc<dyn Backend>, BackendError> {
    let client = http_client(Duration::from_secs(config.timeout_secs))?;
    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Ollama => Arc::new(OllamaBackend::new(client, config.ollama.clone())),
        BackendKind::Gemini => Arc::new(GeminiBackend::new(client, config.gemini.clone())),
    };
    tracing::info!(backend = backend.name(), "Generation backend configured");
    Ok(backend)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Trimmed completion, rejecting empty output.
fn clean_completion(raw: &str) -> Result<String, BackendError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(BackendError::Malformed("empty completion".into()));
    }
    Ok(text.to_owned())
}

/// Record the outcome of a backend call on its span and in metrics.
fn record_outcome(
    span: &Span,
    backend: &'static str,
    response_field: &'static str,
    result: &Result<String, BackendError>,
) {
    match result {
        Ok(response) => {
            span.record(response_field, response.as_str());
            metrics::record_backend_call(backend, true);
        }
        Err(e) => {
            span.record("otel.status_code", "ERROR");
            span.in_scope(|| tracing::error!(backend, error = %e, "Backend call failed"));
            metrics::record_backend_call(backend, false);
        }
    }
}
