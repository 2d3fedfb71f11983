//! Authentication gate.
//!
//! # Responsibilities
//! - Short-circuit public paths with Allowed and empty claims
//! - Require and verify a bearer credential on protected paths
//! - Produce a per-request AuthDecision, nothing else
//!
//! # Design Decisions
//! - Deny by default: a protected path with no credential never
//!   reaches a backend
//! - Public paths skip credential inspection entirely, so health and
//!   status endpoints work even while the identity provider is down
//! - No role or permission checks here; backends own those

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::auth::verifier::{Claims, TokenVerifier};

/// Outcome of the authentication check for one request.
#[derive(Debug)]
pub enum AuthDecision {
    /// Caller is known (or the path is public).
    Allowed(Claims),
    /// Caller is rejected; the request must not be forwarded.
    Denied(DenyReason),
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No bearer credential on a protected path.
    MissingCredential,
    /// Credential present but failed verification.
    InvalidCredential,
}

/// Extract the bearer token from request headers, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Gate deciding whether a request may proceed to a backend.
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGate {
    /// Create a gate backed by the given verifier.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Decide whether the request may proceed.
    pub fn authorize(&self, is_public: bool, credential: Option<&str>) -> AuthDecision {
        if is_public {
            return AuthDecision::Allowed(Claims::default());
        }

        let Some(token) = credential else {
            return AuthDecision::Denied(DenyReason::MissingCredential);
        };

        match self.verifier.verify(token) {
            Ok(claims) => AuthDecision::Allowed(claims),
            Err(e) => {
                tracing::debug!(error = %e, "credential verification failed");
                AuthDecision::Denied(DenyReason::InvalidCredential)
            }
        }
    }
}
