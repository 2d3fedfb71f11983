//! Gateway-produced responses.
//!
//! # Responsibilities
//! - Map every rejection onto a status code and a structured body
//! - Keep the error kinds distinct enough that a caller can tell
//!   "try again later" apart from "this will never work"
//!
//! # Design Decisions
//! - Backend responses never pass through here; only the gateway's own
//!   rejections do, so a backend's status codes stay untouched
//! - 401 carries WWW-Authenticate, 503 carries Retry-After

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Structured error body returned to callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable error kind.
    pub error: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

/// A request the gateway rejected or failed on its own.
#[derive(Debug)]
pub enum GatewayRejection {
    /// No route rule matched the path. Expected for unregistered paths.
    NoRoute { path: String },
    /// Protected path, no bearer credential.
    MissingCredential,
    /// Protected path, credential failed verification.
    InvalidCredential,
    /// Retries exhausted against an unreachable backend.
    UpstreamUnavailable { retry_after_secs: u64 },
    /// The backend did not answer within the timeout ceiling.
    UpstreamTimeout,
    /// The backend answered with something that is not valid HTTP.
    UpstreamProtocolError,
    /// Matched route names a service the registry does not know.
    /// Startup validation makes this unreachable; kept as a guard.
    UnknownService { service: String },
    /// The inbound body could not be read.
    BodyReadFailed,
}

impl GatewayRejection {
    /// Status code for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoRoute { .. } => StatusCode::NOT_FOUND,
            Self::MissingCredential | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamProtocolError => StatusCode::BAD_GATEWAY,
            Self::UnknownService { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BodyReadFailed => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoRoute { .. } => "no_route",
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::UpstreamProtocolError => "upstream_protocol_error",
            Self::UnknownService { .. } => "unknown_service",
            Self::BodyReadFailed => "body_read_failed",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::NoRoute { path } => format!("no service is registered for '{path}'"),
            Self::MissingCredential => "a bearer credential is required".to_string(),
            Self::InvalidCredential => "the bearer credential was rejected".to_string(),
            Self::UpstreamUnavailable { .. } => {
                "the backend service is temporarily unavailable, retry later".to_string()
            }
            Self::UpstreamTimeout => "the backend service did not respond in time".to_string(),
            Self::UpstreamProtocolError => {
                "the backend service returned an invalid response".to_string()
            }
            Self::UnknownService { service } => {
                format!("service '{service}' is not registered")
            }
            Self::BodyReadFailed => "the request body could not be read".to_string(),
        }
    }
}

impl IntoResponse for GatewayRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.message(),
        };

        let mut response = (self.status(), Json(body)).into_response();
        match self {
            Self::MissingCredential | Self::InvalidCredential => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    axum::http::HeaderValue::from_static("Bearer"),
                );
            }
            Self::UpstreamUnavailable { retry_after_secs } => {
                if let Ok(value) = retry_after_secs.to_string().parse() {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
            }
            _ => {}
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            GatewayRejection::NoRoute { path: "/x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayRejection::MissingCredential.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayRejection::UpstreamUnavailable { retry_after_secs: 2 }.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayRejection::UpstreamTimeout.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GatewayRejection::UpstreamProtocolError.status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn unavailable_carries_retry_after() {
        let response =
            GatewayRejection::UpstreamUnavailable { retry_after_secs: 2 }.into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "2");
    }

    #[test]
    fn unauthorized_carries_www_authenticate() {
        let response = GatewayRejection::MissingCredential.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
