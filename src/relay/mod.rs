//! Hop protocol.
//!
//! # Data Flow
//! ```text
//! POST /message
//!     → handler.rs (method check, decode Envelope, extract trace context)
//!     → transform (mutate the working text)
//!     → hosts::HostRotator (next hop or end of chain)
//!     → forwarder.rs (detached POST to the next hop, trace context injected)
//!     → acknowledgement returned without waiting for the forward
//! ```
//!
//! # Chain States
//! - first hop: `modified_text` empty, `original_text` is mutated
//! - relay hop: `modified_text` carries the previous output
//! - terminal: the next hop would be the first registry entry

pub mod envelope;
pub mod forwarder;
pub mod handler;

pub use envelope::{Envelope, HopKind, ACKNOWLEDGEMENT};
pub use forwarder::{ForwardError, ForwardOutcome, Forwarder};
pub use handler::{HopReport, RelayError, RelayHandler};
