//! HTTP server setup and the gateway pipeline.
//!
//! # Responsibilities
//! - Create the Axum router with the wildcard gateway handler
//! - Wire up middleware (request id, tracing)
//! - Drive the per-request pipeline: match → authorize → forward
//! - Apply the retry policy and map outcomes onto responses
//!
//! # Pipeline
//! ```text
//! inbound request
//!     → RouteTable.match_path      (404 on NoRoute)
//!     → AuthGate.authorize         (401 on Denied)
//!     → ServiceRegistry.resolve
//!     → run_with_retry(Forwarder)  (503/504/502 on failure)
//!     → backend response passed through unmodified
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, request::Parts, HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::auth::{bearer_token, AuthDecision, AuthGate, DenyReason, JwtVerifier, TokenVerifier};
use crate::config::schema::{GatewayConfig, TimeoutConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::http::request::{request_id, RequestIdLayer};
use crate::http::response::GatewayRejection;
use crate::observability::metrics;
use crate::proxy::{Forwarder, ProxyOutcome};
use crate::registry::{RegistryError, ServiceRegistry};
use crate::resilience::{run_with_retry, RetryPolicy};
use crate::routing::RouteTable;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub registry: Arc<ServiceRegistry>,
    pub auth: Arc<AuthGate>,
    pub forwarder: Arc<Forwarder>,
    pub retry: RetryPolicy,
    pub retries_enabled: bool,
    pub max_replay_bytes: usize,
    pub timeouts: TimeoutConfig,
}

/// Error building the gateway from configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration invalid: {}", crate::config::validation::join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Build the gateway with the JWT verifier from configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::from_config(&config.auth));
        Self::with_verifier(config, verifier)
    }

    /// Build the gateway with an externally supplied verifier.
    pub fn with_verifier(
        config: GatewayConfig,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Result<Self, StartupError> {
        validate_config(&config).map_err(StartupError::Config)?;

        let registry = Arc::new(ServiceRegistry::from_config(&config.services)?);
        let routes = Arc::new(RouteTable::from_config(&config.routes, &config.public_paths));
        let forwarder = Arc::new(Forwarder::new(Duration::from_secs(
            config.timeouts.connect_secs,
        )));

        let state = AppState {
            routes,
            registry,
            auth: Arc::new(AuthGate::new(verifier)),
            forwarder,
            retry: RetryPolicy::from_config(&config.retries),
            retries_enabled: config.retries.enabled,
            max_replay_bytes: config.retries.max_replay_body_bytes,
            timeouts: config.timeouts.clone(),
        };

        let router = Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http());

        Ok(Self { router, config })
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            services = self.config.services.len(),
            "gateway listening"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler: match, authorize, forward.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let rid = request_id(&request).to_string();
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();
    let method = parts.method.to_string();

    // 1. Match route
    let Some(matched) = state.routes.match_path(&path) else {
        tracing::debug!(request_id = %rid, path = %path, "no route matched");
        metrics::record_request(&method, 404, "none", start);
        return GatewayRejection::NoRoute { path }.into_response();
    };
    let service = matched.service.to_string();

    // 2. Authorize
    match state
        .auth
        .authorize(matched.is_public, bearer_token(&parts.headers))
    {
        AuthDecision::Allowed(claims) => {
            if !matched.is_public {
                tracing::debug!(request_id = %rid, subject = %claims.sub, "caller authenticated");
            }
        }
        AuthDecision::Denied(reason) => {
            tracing::debug!(request_id = %rid, path = %path, ?reason, "request denied");
            metrics::record_request(&method, 401, &service, start);
            return match reason {
                DenyReason::MissingCredential => GatewayRejection::MissingCredential,
                DenyReason::InvalidCredential => GatewayRejection::InvalidCredential,
            }
            .into_response();
        }
    }

    // 3. Resolve backend. Startup validation makes a miss unreachable.
    let Some(base_url) = state.registry.resolve(&service) else {
        tracing::error!(request_id = %rid, service = %service, "matched route has no registry entry");
        metrics::record_request(&method, 500, &service, start);
        return GatewayRejection::UnknownService { service }.into_response();
    };

    // 4. Buffer the body when it is small enough to replay on retry;
    //    large or chunked bodies stream through in a single attempt.
    let (replay, stream_body, ceiling) = if state.retries_enabled
        && can_replay_body(&parts, state.max_replay_bytes)
    {
        match axum::body::to_bytes(body, state.max_replay_bytes).await {
            Ok(bytes) => (Some(bytes), None, state.retry.max_attempts),
            Err(e) => {
                tracing::debug!(request_id = %rid, error = %e, "inbound body read failed");
                metrics::record_request(&method, 400, &service, start);
                return GatewayRejection::BodyReadFailed.into_response();
            }
        }
    } else {
        (None, Some(body), 1)
    };

    // 5. Forward with the retry policy
    let timeout = state.timeouts.for_class(matched.timeout_class);
    let forwarder = state.forwarder.clone();
    let base_url = base_url.clone();
    let forward_path = matched.forward_path.clone();
    let query = parts.uri.query().map(str::to_owned);
    let req_method = parts.method.clone();
    let headers = parts.headers.clone();
    let mut stream_body = stream_body;
    let (outcome, attempts) = run_with_retry(&state.retry, ceiling, move |_| {
        let forwarder = forwarder.clone();
        let base_url = base_url.clone();
        let forward_path = forward_path.clone();
        let query = query.clone();
        let req_method = req_method.clone();
        let headers = headers.clone();
        let body = match &replay {
            Some(bytes) => Body::from(Bytes::clone(bytes)),
            None => stream_body.take().unwrap_or_else(Body::empty),
        };
        async move {
            forwarder
                .forward(
                    &base_url,
                    &forward_path,
                    query.as_deref(),
                    req_method,
                    &headers,
                    body,
                    timeout,
                )
                .await
        }
    })
    .await;

    // 6. Map the outcome; backend status codes pass through untouched
    match outcome {
        ProxyOutcome::UpstreamResponse(response) => {
            let status = response.status();
            tracing::debug!(
                request_id = %rid,
                service = %service,
                status = %status,
                attempts,
                "request proxied"
            );
            metrics::record_request(&method, status.as_u16(), &service, start);
            response
        }
        ProxyOutcome::UpstreamUnreachable => {
            tracing::warn!(
                request_id = %rid,
                service = %service,
                attempts,
                "backend unreachable, retries exhausted"
            );
            metrics::record_request(&method, 503, &service, start);
            GatewayRejection::UpstreamUnavailable {
                retry_after_secs: state.retry.retry_after_secs(),
            }
            .into_response()
        }
        ProxyOutcome::UpstreamTimeout => {
            tracing::warn!(request_id = %rid, service = %service, "backend timed out");
            metrics::record_request(&method, 504, &service, start);
            GatewayRejection::UpstreamTimeout.into_response()
        }
        ProxyOutcome::UpstreamProtocolError => {
            tracing::error!(request_id = %rid, service = %service, "backend returned malformed response");
            metrics::record_request(&method, 502, &service, start);
            GatewayRejection::UpstreamProtocolError.into_response()
        }
    }
}

/// Whether the inbound body can be buffered for replay across attempts.
fn can_replay_body(parts: &Parts, cap: usize) -> bool {
    match declared_length(&parts.headers) {
        Some(length) => length <= cap,
        // no declared length: either no body at all, or a chunked
        // stream of unknown size, which is not replayable
        None => !parts.headers.contains_key(header::TRANSFER_ENCODING),
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
