//! Shutdown coordination for a node.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

use crate::relay::Forwarder;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the server (and anything else long
/// running) subscribes to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of subscribers still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Wait for detached forwards to finish, up to `grace`.
    ///
    /// Returns the number still in flight when the wait ended; those are
    /// abandoned when the runtime stops.
    pub async fn drain_forwards(&self, forwarder: &Forwarder, grace: Duration) -> usize {
        let deadline = Instant::now() + grace;
        loop {
            let remaining = forwarder.in_flight();
            if remaining == 0 {
                return 0;
            }
            if Instant::now() >= deadline {
                tracing::warn!(remaining, "Abandoning in-flight forwards");
                return remaining;
            }
            tracing::debug!(remaining, "Waiting for in-flight forwards");
            sleep(DRAIN_POLL).await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
