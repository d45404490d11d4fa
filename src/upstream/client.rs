//! Upstream billing API client.
//!
//! # Responsibilities
//! - Add the fixed credential and response-type fields to every call
//! - POST form-encoded parameters over HTTPS with certificate verification
//! - Decode the JSON body into an `UpstreamResult`
//! - Report every failure as a `TransportError`, never a panic

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::upstream::types::{
    TransportError, TransportResult, UpstreamAction, UpstreamParams, UpstreamResult,
};

/// Capability to execute one upstream action.
///
/// The adapter service only depends on this trait, so tests can substitute a
/// scripted double for the network client.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send `action` with `params` and return the decoded result.
    async fn send_action(
        &self,
        action: UpstreamAction,
        params: UpstreamParams,
    ) -> TransportResult<UpstreamResult>;
}

/// Production transport: form POSTs against the configured endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    endpoint: Url,
    identifier: String,
    secret: String,
}

impl UpstreamClient {
    /// Create a client from upstream settings and timeouts.
    ///
    /// # Errors
    /// Returns an error when the URL does not parse or the HTTP client cannot
    /// be constructed.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> TransportResult<Self> {
        let endpoint = Url::parse(&upstream.url)?;
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .user_agent(concat!("billing-adapter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Client)?;

        tracing::info!(
            endpoint = %endpoint,
            request_timeout_secs = timeouts.request_secs,
            "Upstream client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            identifier: upstream.identifier.clone(),
            secret: upstream.secret.clone(),
        })
    }

    /// Final form body for `action`: caller params plus the fixed fields.
    ///
    /// Fixed fields are inserted last and overwrite caller keys of the same name.
    pub fn build_form(&self, action: UpstreamAction, mut params: UpstreamParams) -> UpstreamParams {
        params.insert("action".to_string(), action.as_str().to_string());
        params.insert("identifier".to_string(), self.identifier.clone());
        params.insert("secret".to_string(), self.secret.clone());
        params.insert("responsetype".to_string(), "json".to_string());
        params
    }

    async fn post(&self, form: &UpstreamParams) -> TransportResult<UpstreamResult> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::Request)?;
        decode_body(status, &body)
    }
}

#[async_trait]
impl UpstreamTransport for UpstreamClient {
    async fn send_action(
        &self,
        action: UpstreamAction,
        params: UpstreamParams,
    ) -> TransportResult<UpstreamResult> {
        let start_time = Instant::now();
        let form = self.build_form(action, params);

        let outcome = self.post(&form).await;
        match &outcome {
            Ok(result) => {
                tracing::debug!(action = %action, result = %result.result, "Upstream call completed");
            }
            Err(e) => {
                tracing::warn!(action = %action, error = %e, "Upstream call failed");
            }
        }
        metrics::record_upstream_call(action, &outcome, start_time);
        outcome
    }
}

/// Decode an upstream body. The `result` field, not the HTTP status, decides
/// success; the status only matters when the body is unusable.
fn decode_body(status: StatusCode, body: &[u8]) -> TransportResult<UpstreamResult> {
    match serde_json::from_slice::<UpstreamResult>(body) {
        Ok(result) => Ok(result),
        Err(_) if !status.is_success() => Err(TransportError::Status {
            status: status.as_u16(),
        }),
        Err(e) => Err(TransportError::Decode(e)),
    }
}
