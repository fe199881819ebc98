//! Telephone relay node library.
//!
//! Each node accepts a message, maybe changes one word or character, picks
//! the next healthy node in a fixed rotation and forwards the result without
//! waiting for it. The chain ends when the rotation wraps back to the first
//! registered node.

// Core subsystems
pub mod config;
pub mod hosts;
pub mod http;
pub mod relay;
pub mod transform;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::TelephoneConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Envelope, RelayHandler, ACKNOWLEDGEMENT};
