//! Downstream request forwarding.
//!
//! # Responsibilities
//! - Issue the backend call, preserving method, headers, query, body
//! - Enforce the per-request timeout ceiling
//! - Map transport failures onto the ProxyOutcome taxonomy
//!
//! # Design Decisions
//! - Bodies stream through; nothing is buffered here
//! - Backend status codes pass through untranslated, 4xx and 5xx included
//! - The in-flight guard drops on every exit path, so a caller
//!   disconnect (future drop) releases the slot and aborts the call

use std::error::Error as _;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Response, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::proxy::headers::{end_to_end_headers, strip_hop_by_hop};
use crate::proxy::track::InFlightTracker;

/// Result of one downstream attempt.
#[derive(Debug)]
pub enum ProxyOutcome {
    /// Backend produced a response; status and body pass through as-is.
    UpstreamResponse(Response<Body>),
    /// Connection could not be established or broke before a response.
    UpstreamUnreachable,
    /// The timeout ceiling elapsed before a response arrived.
    UpstreamTimeout,
    /// Backend answered with something that is not valid HTTP.
    UpstreamProtocolError,
}

/// Issues downstream HTTP calls on behalf of the gateway.
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    in_flight: InFlightTracker,
}

impl Forwarder {
    /// Create a forwarder with the given connect timeout.
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            in_flight: InFlightTracker::new(),
        }
    }

    /// Number of downstream calls currently in flight.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.count()
    }

    /// Forward one request to a backend.
    #[allow(clippy::too_many_arguments)]
    pub async fn forward(
        &self,
        base_url: &Url,
        forward_path: &str,
        query: Option<&str>,
        method: Method,
        headers: &HeaderMap,
        body: Body,
        timeout: Duration,
    ) -> ProxyOutcome {
        let _guard = self.in_flight.track();

        let mut target = format!("{}{}", base_url.as_str().trim_end_matches('/'), forward_path);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        let uri: Uri = match target.parse() {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(uri = %target, error = %e, "forward target is not a valid uri");
                return ProxyOutcome::UpstreamProtocolError;
            }
        };

        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(out_headers) = builder.headers_mut() {
            *out_headers = end_to_end_headers(headers);
        }
        let request = match builder.body(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, "failed to build downstream request");
                return ProxyOutcome::UpstreamProtocolError;
            }
        };

        match tokio::time::timeout(timeout, self.client.request(request)).await {
            Err(_) => ProxyOutcome::UpstreamTimeout,
            Ok(Err(e)) => classify_client_error(&e),
            Ok(Ok(response)) => {
                let (mut parts, incoming) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                ProxyOutcome::UpstreamResponse(Response::from_parts(parts, Body::new(incoming)))
            }
        }
    }
}

/// Map a client error onto the outcome taxonomy.
///
/// Connect-level failures (refused, DNS, reset before a full response)
/// are unreachable; parse-level failures are protocol errors.
fn classify_client_error(err: &hyper_util::client::legacy::Error) -> ProxyOutcome {
    if err.is_connect() {
        return ProxyOutcome::UpstreamUnreachable;
    }

    if let Some(inner) = err.source().and_then(|s| s.downcast_ref::<hyper::Error>()) {
        if inner.is_parse() || inner.is_parse_status() || inner.is_parse_too_large() {
            return ProxyOutcome::UpstreamProtocolError;
        }
        if inner.is_incomplete_message() || inner.is_closed() || inner.is_canceled() {
            tracing::debug!(error = %inner, "connection broke before a complete response");
            return ProxyOutcome::UpstreamUnreachable;
        }
    }

    tracing::debug!(error = %err, "unclassified client error treated as protocol error");
    ProxyOutcome::UpstreamProtocolError
}
