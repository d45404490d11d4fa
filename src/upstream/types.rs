//! Upstream wire types and error definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Form parameters for one upstream call. Ordered so encoded bodies are stable.
pub type UpstreamParams = BTreeMap<String, String>;

/// Upstream API actions used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamAction {
    ValidateLogin,
    GetClientsDetails,
    AddClient,
}

impl UpstreamAction {
    /// Action name as the upstream API spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamAction::ValidateLogin => "ValidateLogin",
            UpstreamAction::GetClientsDetails => "GetClientsDetails",
            UpstreamAction::AddClient => "AddClient",
        }
    }
}

impl fmt::Display for UpstreamAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream-assigned identifier for a user or client.
///
/// The upstream API returns ids as JSON numbers or strings depending on the
/// action and version; the original JSON type is kept when echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientId::Numeric(id) => write!(f, "{}", id),
            ClientId::Text(id) => f.write_str(id),
        }
    }
}

/// Decoded upstream response.
///
/// Only `result` and `message` are common to every action; everything else
/// lands in `payload` and is read by key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamResult {
    /// `"success"` or `"error"`. Non-text values decode as empty.
    #[serde(default, deserialize_with = "lenient_result")]
    pub result: String,

    /// Human-readable message, usually present on errors.
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,

    /// Action-specific fields.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl UpstreamResult {
    /// Whether the upstream reported success.
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }

    /// Decode a payload field, treating absent, `null` and mistyped values as `None`.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.payload.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => serde_json::from_value(value.clone()).ok(),
        }
    }
}

/// Text form of a scalar; `null`, arrays and objects have none.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_result<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Errors raised while talking to the upstream API.
///
/// These never reach HTTP callers; the adapter service converts them into
/// generic failure envelopes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or other request-level failure.
    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Non-2xx response whose body was not a decodable result.
    #[error("upstream returned HTTP {status} without a decodable body")]
    Status { status: u16 },

    /// Response body was not valid JSON of the expected shape.
    #[error("upstream response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured upstream URL could not be parsed.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed.
    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type for upstream calls.
pub type TransportResult<T> = Result<T, TransportError>;
