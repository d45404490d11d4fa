//! Adapter service subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login    → Credentials         → validate_login
//!                    → ValidateLogin → GetClientsDetails
//! POST /register → RegistrationRequest → add_client
//!                    → (local validation) → AddClient
//!     ← AdapterResult {success, message, [user | clientId]}
//! ```

pub mod service;
pub mod types;

pub use service::AdapterService;
pub use types::{
    AdapterPayload, AdapterResult, ClientProfile, Credentials, RegistrationRequest,
    REQUIRED_REGISTRATION_FIELDS,
};
