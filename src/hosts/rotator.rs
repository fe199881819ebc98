//! Health-aware rotation over the host registry.
//!
//! Adapted from round-robin selection: instead of a shared counter, the
//! starting point is derived per request from the node's own position.

use std::sync::Arc;

use crate::hosts::probe::HealthProbe;
use crate::hosts::registry::HostRegistry;

/// Result of resolving the next hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHop {
    /// Id of the selected host.
    pub id: String,
    /// Message URL of the selected host.
    pub message_url: String,
    /// The selection wrapped to the first registry entry: the chain is
    /// complete and nothing must be forwarded.
    pub terminal: bool,
}

impl NextHop {
    /// Where to forward, or `None` when the chain is complete.
    pub fn forward_url(&self) -> Option<&str> {
        (!self.terminal).then_some(self.message_url.as_str())
    }
}

/// Resolves the next hop for a node.
pub struct HostRotator {
    registry: Arc<HostRegistry>,
    probe: Arc<dyn HealthProbe>,
}

impl HostRotator {
    pub fn new(registry: Arc<HostRegistry>, probe: Arc<dyn HealthProbe>) -> Self {
        Self { registry, probe }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Resolve the host after `current_id` in rotation order.
    ///
    /// Probes at most one full cycle of candidates, starting right after the
    /// current position (or at index 0 when `current_id` is not registered),
    /// and returns the first healthy one. If none is healthy the immediate
    /// successor is returned regardless of health.
    pub async fn next_healthy_host(&self, current_id: &str) -> NextHop {
        let entries = self.registry.entries();
        let len = entries.len();

        let start = match self.registry.position(current_id) {
            Some(index) => index + 1,
            None => {
                tracing::debug!(node = %current_id, "Node not in host registry, starting from 0");
                0
            }
        };

        let mut selected = None;
        for offset in 0..len {
            let index = (start + offset) % len;
            let candidate = &entries[index];
            if self.probe.is_healthy(candidate).await {
                selected = Some(index);
                break;
            }
            tracing::debug!(candidate = %candidate.id, "Skipping unhealthy host");
        }

        let index = selected.unwrap_or_else(|| {
            let fallback = start % len;
            tracing::warn!(
                node = %current_id,
                fallback = %entries[fallback].id,
                "No healthy host found, falling back to the immediate successor"
            );
            fallback
        });

        let entry = &entries[index];
        NextHop {
            id: entry.id.clone(),
            message_url: entry.message_url.clone(),
            terminal: index == 0,
        }
    }

    /// Message URL of the next hop, or `None` when the chain is complete.
    pub async fn next_host_url(&self, current_id: &str) -> Option<String> {
        self.next_healthy_host(current_id)
            .await
            .forward_url()
            .map(str::to_owned)
    }

    /// Resolve the next hop and probe it once more.
    pub async fn next_host_health(&self, current_id: &str) -> bool {
        let next = self.next_healthy_host(current_id).await;
        match self.registry.lookup(&next.id) {
            Some(entry) => self.probe.is_healthy(entry).await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_hosts;
    use crate::hosts::probe::StaticProbe;
    use crate::hosts::registry::HostEntry;

    fn build(probe: StaticProbe) -> (HostRotator, Arc<StaticProbe>) {
        let registry = Arc::new(HostRegistry::from_config(&default_hosts()).unwrap());
        let probe = Arc::new(probe);
        (HostRotator::new(registry, probe.clone()), probe)
    }

    #[tokio::test]
    async fn test_rotation_table() {
        // (self id, all healthy, expected next)
        let cases = [
            ("tele0", true, "tele1"),
            ("tele0", false, "tele1"),
            ("tele4", true, "tele0"),
            ("tele4", false, "tele0"),
            ("tele33", true, "tele0"),
            ("tele33", false, "tele0"),
        ];

        for (node, healthy, expected) in cases {
            let probe = if healthy {
                StaticProbe::all_healthy()
            } else {
                StaticProbe::all_unhealthy()
            };
            let (rotator, _) = build(probe);
            let next = rotator.next_healthy_host(node).await;
            assert_eq!(next.id, expected, "node {node}, healthy {healthy}");
        }
    }

    #[tokio::test]
    async fn test_first_node_hands_to_second() {
        let (rotator, probe) = build(StaticProbe::all_healthy());
        let next = rotator.next_healthy_host("tele0").await;

        assert_eq!(next.id, "tele1");
        assert!(!next.terminal);
        assert_eq!(next.forward_url(), Some("http://tele1:8081/message"));
        assert_eq!(probe.probes(), 1);
    }

    #[tokio::test]
    async fn test_last_node_completes_chain() {
        let (rotator, _) = build(StaticProbe::all_healthy());
        let next = rotator.next_healthy_host("tele4").await;

        assert_eq!(next.id, "tele0");
        assert!(next.terminal);
        assert_eq!(rotator.next_host_url("tele4").await, None);
    }

    #[tokio::test]
    async fn test_unknown_node_starts_at_zero() {
        // an unregistered node with everything down falls back to index 0
        let (rotator, probe) = build(StaticProbe::all_unhealthy());
        let next = rotator.next_healthy_host("tele33").await;

        assert_eq!(next.id, "tele0");
        assert!(next.terminal);
        assert_eq!(probe.probes(), 5);

        // with entry 0 down the search continues from index 1
        let (rotator, _) = build(StaticProbe::healthy_hosts(["tele2"]));
        assert_eq!(rotator.next_healthy_host("tele33").await.id, "tele2");
    }

    #[tokio::test]
    async fn test_skips_unhealthy_hosts() {
        let (rotator, probe) = build(StaticProbe::healthy_hosts(["tele3"]));
        let next = rotator.next_healthy_host("tele0").await;

        assert_eq!(next.id, "tele3");
        assert!(!next.terminal);
        // tele1, tele2, tele3
        assert_eq!(probe.probes(), 3);
    }

    #[tokio::test]
    async fn test_skipping_can_wrap_to_terminal() {
        // tele3's successor tele4 is down, tele0 is up: the chain ends
        let (rotator, _) = build(StaticProbe::healthy_hosts(["tele0", "tele1"]));
        let next = rotator.next_healthy_host("tele3").await;

        assert_eq!(next.id, "tele0");
        assert!(next.terminal);
    }

    #[tokio::test]
    async fn test_probes_at_most_one_cycle() {
        let (rotator, probe) = build(StaticProbe::all_unhealthy());
        let next = rotator.next_healthy_host("tele1").await;

        assert_eq!(probe.probes(), 5);
        assert_eq!(next.id, "tele2");
        assert!(!next.terminal);
    }

    #[tokio::test]
    async fn test_single_host_always_terminal() {
        let registry = Arc::new(
            HostRegistry::new(vec![HostEntry::new(
                "solo",
                "http://solo/message",
                "http://solo/health",
            )])
            .unwrap(),
        );
        for probe in [StaticProbe::all_healthy(), StaticProbe::all_unhealthy()] {
            let rotator = HostRotator::new(registry.clone(), Arc::new(probe));
            for node in ["solo", "stranger"] {
                let next = rotator.next_healthy_host(node).await;
                assert_eq!(next.id, "solo");
                assert!(next.terminal);
            }
        }
    }

    #[tokio::test]
    async fn test_next_host_health() {
        let (rotator, _) = build(StaticProbe::healthy_hosts(["tele2"]));
        assert!(rotator.next_host_health("tele1").await);

        let (rotator, _) = build(StaticProbe::all_unhealthy());
        assert!(!rotator.next_host_health("tele1").await);
    }
}
