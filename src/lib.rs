//! Billing Adapter Library

pub mod adapter;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use adapter::{AdapterResult, AdapterService};
pub use config::schema::AdapterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::{UpstreamClient, UpstreamTransport};
