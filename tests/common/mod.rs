//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::{routing::post, Form, Router};
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

use billing_adapter::config::AdapterConfig;
use billing_adapter::upstream::{
    TransportError, TransportResult, UpstreamAction, UpstreamParams, UpstreamResult,
    UpstreamTransport,
};

/// Scripted in-memory upstream that records every call.
///
/// Behaves like the upstream test account by default: `test@example.com` /
/// `testpass` is user 123, whose profile is John Doe.
#[derive(Default)]
pub struct ScriptedTransport {
    calls: Mutex<Vec<(UpstreamAction, UpstreamParams)>>,
    overrides: Mutex<HashMap<UpstreamAction, Value>>,
    failing: Mutex<Vec<UpstreamAction>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `action` with `body` instead of the default fixture.
    pub fn respond_with(&self, action: UpstreamAction, body: Value) {
        self.overrides.lock().unwrap().insert(action, body);
    }

    /// Make `action` fail at the transport level.
    pub fn fail(&self, action: UpstreamAction) {
        self.failing.lock().unwrap().push(action);
    }

    pub fn calls(&self) -> Vec<(UpstreamAction, UpstreamParams)> {
        self.calls.lock().unwrap().clone()
    }

    fn fixture(action: UpstreamAction, params: &UpstreamParams) -> Value {
        match action {
            UpstreamAction::ValidateLogin => {
                let valid = params.get("email").map(String::as_str) == Some("test@example.com")
                    && params.get("password2").map(String::as_str) == Some("testpass");
                if valid {
                    json!({"result": "success", "userid": 123})
                } else {
                    json!({"result": "error", "message": "Email or Password Invalid"})
                }
            }
            UpstreamAction::GetClientsDetails => {
                if params.get("clientid").map(String::as_str) == Some("123") {
                    json!({
                        "result": "success",
                        "client": {"firstname": "John", "lastname": "Doe", "email_verified": true}
                    })
                } else {
                    json!({"result": "error", "message": "Client Not Found"})
                }
            }
            UpstreamAction::AddClient => json!({"result": "success", "clientid": 501}),
        }
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedTransport {
    async fn send_action(
        &self,
        action: UpstreamAction,
        params: UpstreamParams,
    ) -> TransportResult<UpstreamResult> {
        self.calls.lock().unwrap().push((action, params.clone()));

        if self.failing.lock().unwrap().contains(&action) {
            let cause = serde_json::from_str::<Value>("<html>502</html>").unwrap_err();
            return Err(TransportError::Decode(cause));
        }

        let body = self
            .overrides
            .lock()
            .unwrap()
            .get(&action)
            .cloned()
            .unwrap_or_else(|| Self::fixture(action, &params));
        Ok(serde_json::from_value(body).unwrap())
    }
}

/// Config suitable for tests; the upstream URL is only used by real clients.
pub fn test_config(upstream_url: &str) -> AdapterConfig {
    let mut config = AdapterConfig::default();
    config.upstream.url = upstream_url.to_string();
    config.upstream.identifier = "test-identifier".to_string();
    config.upstream.secret = "test-secret".to_string();
    config.observability.metrics_enabled = false;
    config
}

/// A complete, valid registration body.
pub fn registration_body() -> Map<String, Value> {
    json!({
        "firstname": "Jane",
        "lastname": "Roe",
        "email": "jane@example.com",
        "password": "pa55word",
        "address1": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postcode": "62701",
        "country": "US",
        "phonenumber": "555-0100"
    })
    .as_object()
    .cloned()
    .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Form bodies received by a mock upstream, in arrival order.
pub type ReceivedForms = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Start a programmable mock upstream on an ephemeral port.
///
/// `respond` maps each received form to `(status, body)`.
pub async fn start_mock_upstream<F>(respond: F) -> (SocketAddr, ReceivedForms)
where
    F: Fn(&HashMap<String, String>) -> (StatusCode, String) + Send + Sync + 'static,
{
    let received: ReceivedForms = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorder = received.clone();
    let app = Router::new().route(
        "/includes/api.php",
        post(move |Form(form): Form<HashMap<String, String>>| {
            let recorder = recorder.clone();
            let respond = respond.clone();
            async move {
                let (status, body) = respond(&form);
                recorder.lock().unwrap().push(form);
                (status, body)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, received)
}

/// Mock upstream that answers like the test account fixture.
pub async fn start_fixture_upstream() -> (SocketAddr, ReceivedForms) {
    start_mock_upstream(|form| {
        let mut params = UpstreamParams::new();
        for (key, value) in form {
            params.insert(key.clone(), value.clone());
        }
        let action = match form.get("action").map(String::as_str) {
            Some("ValidateLogin") => UpstreamAction::ValidateLogin,
            Some("GetClientsDetails") => UpstreamAction::GetClientsDetails,
            Some("AddClient") => UpstreamAction::AddClient,
            _ => {
                return (
                    StatusCode::OK,
                    json!({"result": "error", "message": "Invalid action"}).to_string(),
                )
            }
        };
        (StatusCode::OK, ScriptedTransport::fixture(action, &params).to_string())
    })
    .await
}

/// An address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn upstream_url(addr: SocketAddr) -> String {
    format!("http://{}/includes/api.php", addr)
}
