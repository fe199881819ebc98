//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides, then CLI flags in main)
//!     → validation.rs (semantic checks)
//!     → TelephoneConfig (validated, immutable)
//!     → consumed once at startup to build the relay
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the host registry never changes at runtime
//! - All fields have defaults so a node runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    BackendKind, ForwardConfig, HealthCheckConfig, HostConfig, ListenerConfig,
    ObservabilityConfig, TelephoneConfig, TransformConfig, TransformMode,
};
pub use validation::{validate_config, ValidationError};
