//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. All errors are
//! collected so an operator sees every problem at once.

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::TelephoneConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("host registry is empty")]
    EmptyRegistry,

    #[error("duplicate host id '{0}'")]
    DuplicateHost(String),

    #[error("host '{host}' has an invalid {field}: {reason}")]
    InvalidUrl {
        host: String,
        field: &'static str,
        reason: String,
    },

    #[error("{field} must be a URL: {reason}")]
    InvalidEndpoint { field: &'static str, reason: String },

    #[error("trigger_probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &TelephoneConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("listener.request_timeout_secs"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_body_bytes"));
    }

    if config.hosts.is_empty() {
        errors.push(ValidationError::EmptyRegistry);
    }
    let mut seen = HashSet::new();
    for host in &config.hosts {
        if !seen.insert(host.id.as_str()) {
            errors.push(ValidationError::DuplicateHost(host.id.clone()));
        }
        for (field, value) in [("message_url", &host.message_url), ("health_url", &host.health_url)] {
            if let Err(e) = Url::parse(value) {
                errors.push(ValidationError::InvalidUrl {
                    host: host.id.clone(),
                    field,
                    reason: e.to_string(),
                });
            }
        }
    }

    if config.health_check.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("health_check.timeout_secs"));
    }

    let transform = &config.transform;
    if !(0.0..=1.0).contains(&transform.trigger_probability) {
        errors.push(ValidationError::InvalidProbability(transform.trigger_probability));
    }
    if transform.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("transform.timeout_secs"));
    }
    for (field, value) in [
        ("transform.ollama.endpoint", &transform.ollama.endpoint),
        ("transform.gemini.endpoint", &transform.gemini.endpoint),
    ] {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError::InvalidEndpoint {
                field,
                reason: e.to_string(),
            });
        }
    }

    if config.forward.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("forward.timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HostConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&TelephoneConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TelephoneConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.transform.trigger_probability = 1.5;
        config.forward.timeout_secs = 0;
        config.hosts.push(HostConfig {
            id: "tele0".into(),
            message_url: "not a url".into(),
            health_url: "http://tele0:8080/health".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("nowhere".into())));
        assert!(errors.contains(&ValidationError::InvalidProbability(1.5)));
        assert!(errors.contains(&ValidationError::ZeroValue("forward.timeout_secs")));
        assert!(errors.contains(&ValidationError::DuplicateHost("tele0".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { field: "message_url", .. })));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let mut config = TelephoneConfig::default();
        config.hosts.clear();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::EmptyRegistry])
        );
    }
}
