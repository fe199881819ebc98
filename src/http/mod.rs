//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs
//!         /message → relay::RelayHandler → acknowledgement
//!         /health  → "OK"
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
