//! Upstream billing API subsystem.
//!
//! # Data Flow
//! ```text
//! AdapterService
//!     → UpstreamTransport::send_action(action, params)
//!     → client.rs (add identifier/secret/responsetype, form POST over HTTPS)
//!     → types.rs (decode JSON into UpstreamResult)
//!     ← Result<UpstreamResult, TransportError>
//! ```
//!
//! # Security Constraints
//! - Credentials ONLY from configuration, injected at construction
//! - Never log the secret or forwarded passwords
//! - TLS certificate and host verification always on

pub mod client;
pub mod types;

pub use client::{UpstreamClient, UpstreamTransport};
pub use types::{
    ClientId, TransportError, TransportResult, UpstreamAction, UpstreamParams, UpstreamResult,
};
