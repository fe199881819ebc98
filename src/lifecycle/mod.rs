//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → registry, probe, transformer, forwarder → RelayHandler
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain in-flight forwards → flush traces
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then relay, then listeners
//! - Forward drain has a deadline; late forwards are abandoned

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{build_relay, StartupError};
