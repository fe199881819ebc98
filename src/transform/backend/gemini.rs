//! Hosted Gemini `generateContent` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{field, Instrument};

use super::{clean_completion, record_outcome, Backend, BackendError};
use crate::config::schema::GeminiConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(BackendError::MissingCredential)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        let text = body
            .first_text()
            .ok_or_else(|| BackendError::Malformed("no candidate text".into()))?;
        clean_completion(&text)
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let span = tracing::info_span!(
            "call-gemini",
            otel.kind = "client",
            gemini.model = %self.config.model,
            gemini.prompt = %prompt,
            gemini.response = field::Empty,
            otel.status_code = field::Empty,
        );

        let result = self.generate(prompt).instrument(span.clone()).await;
        record_outcome(&span, self.name(), "gemini.response", &result);
        result
    }
}
