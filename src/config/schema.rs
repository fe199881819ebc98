//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a relay node.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for a telephone node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelephoneConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Identity of this node within the host registry.
    pub node: NodeConfig,

    /// Ordered host registry. Order defines the rotation.
    pub hosts: Vec<HostConfig>,

    /// Health probe settings used during rotation.
    pub health_check: HealthCheckConfig,

    /// Text mutation settings.
    pub transform: TransformConfig,

    /// Outbound forwarding settings.
    pub forward: ForwardConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for TelephoneConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            node: NodeConfig::default(),
            hosts: default_hosts(),
            health_check: HealthCheckConfig::default(),
            transform: TransformConfig::default(),
            forward: ForwardConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// The five-node topology the game is usually played with.
pub fn default_hosts() -> Vec<HostConfig> {
    (0..5)
        .map(|i| {
            let id = format!("tele{i}");
            let port = 8080 + i;
            HostConfig {
                message_url: format!("http://{id}:{port}/message"),
                health_url: format!("http://{id}:{port}/health"),
                id,
            }
        })
        .collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Total time allowed for handling one inbound request, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 60,
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Explicit node id. When unset the host name is used.
    pub id: Option<String>,
}

/// A single entry of the host registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostConfig {
    /// Node identity, matched against the running node's id.
    pub id: String,

    /// URL accepting `POST /message`.
    pub message_url: String,

    /// URL answering health probes.
    pub health_url: String,
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Probe candidates before selecting them. When disabled every host is
    /// treated as healthy.
    pub enabled: bool,

    /// Optional probe timeout in seconds. Unset means the client default
    /// (no timeout).
    pub timeout_secs: Option<u64>,

    /// User agent sent with probes.
    pub user_agent: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: None,
            user_agent: "telephone-health-check".to_string(),
        }
    }
}

/// Which mutation strategy a node applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    /// Bump one character to its successor.
    Local,
    /// Ask a generation backend for the opposite of one word.
    Opposite,
}

impl FromStr for TransformMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(TransformMode::Local),
            "opposite" => Ok(TransformMode::Opposite),
            other => Err(format!("unknown transform mode '{other}' (expected local or opposite)")),
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformMode::Local => f.write_str("local"),
            TransformMode::Opposite => f.write_str("opposite"),
        }
    }
}

/// Generation backend used by the opposite-word mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Ollama,
    Gemini,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" => Ok(BackendKind::Gemini),
            other => Err(format!("unknown backend '{other}' (expected ollama or gemini)")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Ollama => f.write_str("ollama"),
            BackendKind::Gemini => f.write_str("gemini"),
        }
    }
}

/// Text mutation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Mutation strategy.
    pub mode: TransformMode,

    /// Backend used when `mode = "opposite"`.
    pub backend: BackendKind,

    /// Probability in `[0, 1]` that a hop attempts a mutation at all.
    pub trigger_probability: f64,

    /// Seed for a reproducible random source.
    pub seed: Option<u64>,

    /// Per-call timeout for backend requests in seconds.
    pub timeout_secs: u64,

    pub ollama: OllamaConfig,

    pub gemini: GeminiConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            mode: TransformMode::Opposite,
            backend: BackendKind::Ollama,
            trigger_probability: 0.5,
            seed: None,
            timeout_secs: 30,
            ollama: OllamaConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Local Ollama generation endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Full URL of the generate endpoint.
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://ollama:11434/api/generate".to_string(),
            model: "gemma3:270m".to_string(),
        }
    }
}

/// Remote Gemini generation endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL, without the `/models/...` suffix.
    pub endpoint: String,
    pub model: String,

    /// API key. Usually supplied through `GOOGLE_API_KEY` or `GEMINI_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 8,
        }
    }
}

/// Outbound forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Per-forward timeout in seconds.
    pub timeout_secs: u64,

    /// How long shutdown waits for in-flight forwards, in seconds.
    pub drain_secs: u64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            drain_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// `service.name` resource attribute on exported spans.
    pub service_name: String,

    /// OTLP/gRPC collector endpoint. Spans are not exported when unset.
    pub otlp_endpoint: Option<String>,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            service_name: "telephone".to_string(),
            otlp_endpoint: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
