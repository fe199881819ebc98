//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::TelephoneConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TelephoneConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TelephoneConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut TelephoneConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides read through `lookup`.
///
/// Recognised keys: `PORT`, `NODE_ID`, `TELEPHONE_MODE`, `TELEPHONE_BACKEND`,
/// `TELEPHONE_TRIGGER_PROBABILITY`, `OLLAMA_URL`, `GOOGLE_API_KEY`,
/// `GEMINI_API_KEY`, `OTEL_EXPORTER_OTLP_ENDPOINT` and `LOG_LEVEL`.
/// Empty values are ignored.
pub fn apply_overrides<F>(config: &mut TelephoneConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            key: "PORT",
            reason: format!("'{port}' is not a port number"),
        })?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }

    if let Some(id) = get("NODE_ID") {
        config.node.id = Some(id);
    }

    if let Some(mode) = get("TELEPHONE_MODE") {
        config.transform.mode = mode.parse().map_err(|reason| ConfigError::Env {
            key: "TELEPHONE_MODE",
            reason,
        })?;
    }

    if let Some(backend) = get("TELEPHONE_BACKEND") {
        config.transform.backend = backend.parse().map_err(|reason| ConfigError::Env {
            key: "TELEPHONE_BACKEND",
            reason,
        })?;
    }

    if let Some(probability) = get("TELEPHONE_TRIGGER_PROBABILITY") {
        config.transform.trigger_probability =
            probability.trim().parse().map_err(|_| ConfigError::Env {
                key: "TELEPHONE_TRIGGER_PROBABILITY",
                reason: format!("'{probability}' is not a number"),
            })?;
    }

    if let Some(endpoint) = get("OLLAMA_URL") {
        config.transform.ollama.endpoint = endpoint;
    }

    // GOOGLE_API_KEY wins over GEMINI_API_KEY; a key from the file wins over both.
    if config.transform.gemini.api_key.is_none() {
        config.transform.gemini.api_key = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY"));
    }

    if let Some(endpoint) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.observability.otlp_endpoint = Some(endpoint);
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level.to_lowercase();
    }

    Ok(())
}

/// Replace the port of a `host:port` bind address, keeping the host.
pub fn with_port(bind_address: &str, port: u16) -> String {
    let host = bind_address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or("0.0.0.0");
    format!("{host}:{port}")
}
