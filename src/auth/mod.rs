//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Request headers + route classification
//!     → gate.rs (public short-circuit, bearer extraction)
//!     → verifier.rs (signature and expiry check)
//!     → AuthDecision: Allowed(claims) or Denied(reason)
//! ```
//!
//! # Design Decisions
//! - Public/protected is data-driven via the route table's public
//!   path set, never a global bypass flag
//! - Denials are terminal: no backend call is attempted

pub mod gate;
pub mod verifier;

pub use gate::{bearer_token, AuthDecision, AuthGate, DenyReason};
pub use verifier::{Claims, JwtVerifier, TokenVerifier, VerifyError};
