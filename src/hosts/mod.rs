//! Host topology and next-hop resolution.
//!
//! # Data Flow
//! ```text
//! config [[hosts]]
//!     → registry.rs (ordered, immutable HostRegistry)
//!
//! Per request:
//!     node id (identity.rs)
//!     → rotator.rs (position + 1, wrap, skip unhealthy)
//!         → probe.rs (GET health URL, 200 = healthy)
//!     → NextHop { id, message_url, terminal }
//! ```
//!
//! # Design Decisions
//! - The rotation cursor is derived, never stored: no shared mutable state
//! - Selecting registry entry 0 ends the chain
//! - If every candidate is down the immediate successor is still chosen

pub mod identity;
pub mod probe;
pub mod registry;
pub mod rotator;

pub use identity::resolve_node_id;
pub use probe::{HealthProbe, HttpHealthProbe, ProbeError, StaticProbe};
pub use registry::{HostEntry, HostRegistry, RegistryError};
pub use rotator::{HostRotator, NextHop};
