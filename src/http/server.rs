//! HTTP server setup and endpoint dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing)
//! - Enforce POST-only, body size and JSON body rules
//! - Dispatch `login` / `register` to the adapter service
//! - Map adapter outcomes to HTTP status codes
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::adapter::{AdapterResult, AdapterService, Credentials, RegistrationRequest};
use crate::config::AdapterConfig;
use crate::http::request::{endpoint_from_path, parse_json_object, request_span, UuidRequestId};
use crate::http::response::{
    json_response, login_status, register_status, BODY_TOO_LARGE, CREDENTIALS_REQUIRED,
    ENDPOINT_NOT_FOUND, INVALID_JSON, METHOD_NOT_ALLOWED,
};
use crate::observability::metrics;
use crate::upstream::{TransportError, UpstreamClient, UpstreamTransport};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: AdapterService,
    pub path_prefix: Arc<str>,
    pub max_body_size: usize,
}

/// HTTP server for the adapter.
pub struct HttpServer {
    router: Router,
    config: AdapterConfig,
}

impl HttpServer {
    /// Create a server backed by the production upstream client.
    ///
    /// # Errors
    /// Fails when the upstream client cannot be built from `config`.
    pub fn new(config: AdapterConfig) -> Result<Self, TransportError> {
        let client = UpstreamClient::new(&config.upstream, &config.timeouts)?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    /// Create a server over any upstream transport.
    pub fn with_transport(config: AdapterConfig, transport: Arc<dyn UpstreamTransport>) -> Self {
        let state = AppState {
            service: AdapterService::new(transport),
            path_prefix: Arc::from(config.listener.path_prefix.as_str()),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path_prefix = %self.config.listener.path_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

/// Single entry point for every method and path.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let endpoint = endpoint_from_path(parts.uri.path(), &state.path_prefix);

    let (status, envelope) = handle(&state, &parts.method, &endpoint, body).await;

    tracing::debug!(
        endpoint = %endpoint,
        status = status.as_u16(),
        success = envelope.success,
        "Request handled"
    );
    metrics::record_request(endpoint_label(&endpoint), status.as_u16(), start_time);
    json_response(status, envelope)
}

async fn handle(
    state: &AppState,
    method: &Method,
    endpoint: &str,
    body: Body,
) -> (StatusCode, AdapterResult) {
    if *method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            AdapterResult::failure(METHOD_NOT_ALLOWED),
        );
    }

    let bytes = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_size, "Request body rejected");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                AdapterResult::failure(BODY_TOO_LARGE),
            );
        }
    };

    let Some(fields) = parse_json_object(&bytes) else {
        return (StatusCode::BAD_REQUEST, AdapterResult::failure(INVALID_JSON));
    };

    match endpoint {
        "login" => {
            let Some(credentials) = Credentials::from_body(&fields) else {
                return (
                    StatusCode::BAD_REQUEST,
                    AdapterResult::failure(CREDENTIALS_REQUIRED),
                );
            };
            let result = state.service.validate_login(&credentials).await;
            (login_status(&result), result)
        }
        "register" => {
            let result = state
                .service
                .add_client(RegistrationRequest::new(fields))
                .await;
            (register_status(&result), result)
        }
        _ => (
            StatusCode::NOT_FOUND,
            AdapterResult::failure(ENDPOINT_NOT_FOUND),
        ),
    }
}

/// Bounded label set for request metrics.
fn endpoint_label(endpoint: &str) -> &'static str {
    match endpoint {
        "login" => "login",
        "register" => "register",
        _ => "other",
    }
}
