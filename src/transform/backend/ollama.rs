//! Local Ollama generate endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{field, Instrument};

use super::{clean_completion, record_outcome, Backend, BackendError};
use crate::config::schema::OllamaConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaBackend {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, config: OllamaConfig) -> Self {
        Self { client, config }
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        clean_completion(&body.response)
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let span = tracing::info_span!(
            "call-ollama",
            otel.kind = "client",
            ollama.model = %self.config.model,
            ollama.prompt = %prompt,
            ollama.response = field::Empty,
            otel.status_code = field::Empty,
        );

        let result = self.generate(prompt).instrument(span.clone()).await;
        record_outcome(&span, self.name(), "ollama.response", &result);
        result
    }
}
