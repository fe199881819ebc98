//! Telephone relay node.
//!
//! ```text
//!   previous hop                     this node                         next hop
//!  ─────────────▶ POST /message ─▶ decode ─▶ transform ─▶ rotate ─┬─▶ POST /message
//!                                                                 │    (detached)
//!  ◀───────────── acknowledgement ◀───────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use telephone::config::loader::with_port;
use telephone::config::{
    apply_env_overrides, load_config, validate_config, BackendKind, ConfigError, TelephoneConfig,
    TransformMode,
};
use telephone::hosts::resolve_node_id;
use telephone::lifecycle::{build_relay, shutdown_signal, Shutdown};
use telephone::observability::{self, init_telemetry};
use telephone::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "telephone")]
#[command(about = "Message relay node for the telephone game", version)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "TELEPHONE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port, keeping the configured bind host.
    #[arg(short, long)]
    port: Option<u16>,

    /// This node's id in the host registry.
    #[arg(long)]
    node_id: Option<String>,

    /// Generation backend: ollama or gemini.
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Mutation strategy: local or opposite.
    #[arg(long)]
    mode: Option<TransformMode>,

    /// Probability in [0, 1] that a hop attempts a mutation.
    #[arg(long)]
    trigger_probability: Option<f64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags win over environment and file.
    fn apply(&self, config: &mut TelephoneConfig) {
        if let Some(port) = self.port {
            config.listener.bind_address = with_port(&config.listener.bind_address, port);
        }
        if let Some(id) = &self.node_id {
            config.node.id = Some(id.clone());
        }
        if let Some(backend) = self.backend {
            config.transform.backend = backend;
        }
        if let Some(mode) = self.mode {
            config.transform.mode = mode;
        }
        if let Some(p) = self.trigger_probability {
            config.transform.trigger_probability = p;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TelephoneConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_telemetry(&config.observability)?;

    tracing::info!("telephone v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let node_id = resolve_node_id(config.node.id.as_deref())?;
    let relay = Arc::new(build_relay(&config, &node_id)?);

    tracing::info!(
        node = %node_id,
        bind_address = %config.listener.bind_address,
        mode = %config.transform.mode,
        backend = %config.transform.backend,
        trigger_probability = config.transform.trigger_probability,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config.listener, relay.clone());
    let mut server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server => result??,
        _ = shutdown_signal() => {
            shutdown.trigger();
            server.await??;
        }
    }

    shutdown
        .drain_forwards(relay.forwarder(), Duration::from_secs(config.forward.drain_secs))
        .await;
    observability::tracing::shutdown();

    tracing::info!("Shutdown complete");
    Ok(())
}
