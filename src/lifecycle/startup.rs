//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the host registry, health probe and rotator
//! - Build the text transformer and its backend
//! - Build the forwarder and the shared propagator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Everything built here is immutable afterwards

use std::sync::Arc;

use crate::config::TelephoneConfig;
use crate::hosts::{HealthProbe, HostRegistry, HostRotator, HttpHealthProbe, RegistryError, StaticProbe};
use crate::observability::tracing::propagator;
use crate::relay::{ForwardError, Forwarder, RelayHandler};
use crate::transform::backend::BackendError;
use crate::transform::TextTransformer;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid host registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to build transformer: {0}")]
    Transform(#[from] BackendError),

    #[error("failed to build forwarder: {0}")]
    Forward(#[from] ForwardError),
}

/// Assemble the relay for `node_id` from configuration.
pub fn build_relay(config: &TelephoneConfig, node_id: &str) -> Result<RelayHandler, StartupError> {
    let registry = Arc::new(HostRegistry::from_config(&config.hosts)?);

    if registry.position(node_id).is_none() {
        tracing::warn!(
            node = %node_id,
            "Node is not in the host registry; it will forward to the first healthy host"
        );
    }

    let probe: Arc<dyn HealthProbe> = if config.health_check.enabled {
        Arc::new(HttpHealthProbe::new(&config.health_check))
    } else {
        tracing::info!("Health checks disabled, every host is treated as healthy");
        Arc::new(StaticProbe::all_healthy())
    };

    let transformer = TextTransformer::from_config(&config.transform)?;
    let propagator = Arc::new(propagator());
    let forwarder = Forwarder::new(&config.forward, propagator.clone())?;

    tracing::info!(
        node = %node_id,
        hosts = registry.len(),
        mutator = transformer.mutator_name(),
        "Relay ready"
    );

    Ok(RelayHandler::new(
        node_id,
        transformer,
        HostRotator::new(registry, probe),
        forwarder,
        propagator,
    ))
}
