//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → passed by value to the server and upstream client
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing reads process state afterwards
//! - All fields have defaults to allow minimal configs
//! - Upstream credentials are expected from the environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_default, ConfigError};
pub use schema::{
    AdapterConfig, ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
