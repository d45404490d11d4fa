//! Login and registration operations composed from upstream calls.
//!
//! # Responsibilities
//! - Remap adapter field names to upstream ones (`password` → `password2`)
//! - Validate registration input before any network call
//! - Reshape upstream results into `AdapterResult` envelopes
//! - Catch every `TransportError` here; none escapes to the HTTP layer
//!
//! # Design Decisions
//! - A failed profile lookup never downgrades a successful login
//! - Login failures never echo upstream error text
//! - Registration failures forward the upstream message

use std::sync::Arc;

use crate::adapter::types::{
    AdapterPayload, AdapterResult, ClientProfile, ClientRecord, Credentials, RegistrationRequest,
};
use crate::upstream::{ClientId, UpstreamAction, UpstreamParams, UpstreamTransport};

pub const LOGIN_SUCCESSFUL: &str = "Login successful";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const LOGIN_SYSTEM_ERROR: &str = "System error occurred during login";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const REGISTRATION_SYSTEM_ERROR: &str = "System error occurred during registration";
pub const DETAILS_UNAVAILABLE: &str = "Failed to retrieve user details";
pub const DETAILS_SYSTEM_ERROR: &str = "System error occurred while retrieving user details";

/// Stateless adapter over an injected upstream transport.
#[derive(Clone)]
pub struct AdapterService {
    transport: Arc<dyn UpstreamTransport>,
}

impl AdapterService {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport }
    }

    /// Check credentials upstream and, on success, attach the client profile.
    pub async fn validate_login(&self, credentials: &Credentials) -> AdapterResult {
        let response = match self
            .transport
            .send_action(UpstreamAction::ValidateLogin, credentials.to_upstream_params())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Login aborted by transport failure");
                return AdapterResult::failure(LOGIN_SYSTEM_ERROR);
            }
        };

        let user_id = match response.field::<ClientId>("userid") {
            Some(id) if response.is_success() => id,
            _ => {
                tracing::info!("Login rejected by upstream");
                return AdapterResult::failure(INVALID_CREDENTIALS);
            }
        };

        match self.get_client_details(user_id).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Login successful");
                AdapterResult::success(LOGIN_SUCCESSFUL)
                    .with_payload(AdapterPayload::Login { user })
            }
            Err(detail) => {
                // Authentication already succeeded; report the lookup problem in the message only.
                AdapterResult::success(format!("{LOGIN_SUCCESSFUL} but {detail}"))
            }
        }
    }

    /// Validate and forward a registration.
    pub async fn add_client(&self, registration: RegistrationRequest) -> AdapterResult {
        if let Some(field) = registration.first_missing_field() {
            tracing::debug!(field, "Registration rejected locally");
            return AdapterResult::failure(format!("Missing required field: {field}"));
        }

        let params = registration.into_upstream_params();
        let response = match self
            .transport
            .send_action(UpstreamAction::AddClient, params)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Registration aborted by transport failure");
                return AdapterResult::failure(REGISTRATION_SYSTEM_ERROR);
            }
        };

        let client_id = response.field::<ClientId>("clientid");
        let result = if response.is_success() {
            tracing::info!(client_id = ?client_id, "Client registered");
            AdapterResult::success(REGISTRATION_SUCCESSFUL)
        } else {
            tracing::info!("Registration rejected by upstream");
            AdapterResult::failure(
                response
                    .message
                    .unwrap_or_else(|| REGISTRATION_FAILED.to_string()),
            )
        };
        result.with_payload(AdapterPayload::Registration { client_id })
    }

    /// Fetch the profile for `user_id`, or the message explaining why not.
    async fn get_client_details(&self, user_id: ClientId) -> Result<ClientProfile, &'static str> {
        let mut params = UpstreamParams::new();
        params.insert("clientid".to_string(), user_id.to_string());
        params.insert("stats".to_string(), "0".to_string());

        let response = match self
            .transport
            .send_action(UpstreamAction::GetClientsDetails, params)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Client details lookup failed");
                return Err(DETAILS_SYSTEM_ERROR);
            }
        };

        match response.field::<ClientRecord>("client") {
            Some(record) if response.is_success() => Ok(record.into_profile(user_id)),
            _ => {
                tracing::warn!(user_id = %user_id, "Client details unavailable");
                Err(DETAILS_UNAVAILABLE)
            }
        }
    }
}
