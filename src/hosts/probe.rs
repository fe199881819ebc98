//! Health probing of rotation candidates.
//!
//! # Responsibilities
//! - Issue a GET against a candidate's health URL
//! - Report healthy only for an exact `200 OK`
//!
//! # Design Decisions
//! - Probes are one-shot: no retries, no hysteresis, no cached state
//! - Transport errors, timeouts and non-200 statuses all mean "unhealthy"
//! - Unless configured, no timeout is applied beyond the client's own

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::hosts::registry::HostEntry;
use crate::observability::metrics;

/// Reasons a probe reports a host as unhealthy.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to build health check request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("connection error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("non-OK status {0}")]
    Status(StatusCode),
}

/// Decides whether a rotation candidate may receive the next hop.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn is_healthy(&self, host: &HostEntry) -> bool;
}

/// Probes hosts over plain HTTP.
pub struct HttpHealthProbe {
    client: Client<HttpConnector, Body>,
    timeout: Option<Duration>,
    user_agent: String,
}

impl HttpHealthProbe {
    pub fn new(config: &HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            timeout: config.timeout_secs.map(Duration::from_secs),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Probe a single health URL.
    pub async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(header::USER_AGENT, self.user_agent.as_str())
            .body(Body::empty())?;

        let response_future = self.client.request(request);
        let response = match self.timeout {
            Some(timeout) => time::timeout(timeout, response_future)
                .await
                .map_err(|_| ProbeError::Timeout(timeout))??,
            None => response_future.await?,
        };

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ProbeError::Status(status)),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn is_healthy(&self, host: &HostEntry) -> bool {
        let healthy = match self.probe(&host.health_url).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(host = %host.id, url = %host.health_url, error = %e, "Health check failed");
                false
            }
        };
        metrics::record_health_probe(&host.id, healthy);
        healthy
    }
}

/// Probe with predetermined answers.
///
/// Used when active health checks are disabled (every host healthy) and as a
/// deterministic stand-in for tests. Counts the probes it answers.
#[derive(Debug, Default)]
pub struct StaticProbe {
    healthy: HashSet<String>,
    all_healthy: bool,
    probes: AtomicUsize,
}

impl StaticProbe {
    pub fn all_healthy() -> Self {
        Self {
            all_healthy: true,
            ..Self::default()
        }
    }

    pub fn all_unhealthy() -> Self {
        Self::default()
    }

    /// Only the listed host ids are healthy.
    pub fn healthy_hosts<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            healthy: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Number of probes answered so far.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HealthProbe for StaticProbe {
    async fn is_healthy(&self, host: &HostEntry) -> bool {
        self.probes.fetch_add(1, Ordering::Relaxed);
        self.all_healthy || self.healthy.contains(&host.id)
    }
}
