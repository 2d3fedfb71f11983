//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → forwarder attempt → ProxyOutcome
//!     → retries.rs (classify: Success / Retryable / Fatal)
//!     → Retryable: backoff.rs delay, attempt again within the ceiling
//!     → Exhaustion: surfaced as temporary unavailability
//! ```
//!
//! # Design Decisions
//! - Retry scope is deliberately narrow: unreachability only
//! - Fatal outcomes are reported once, never silently retried
//! - Exhaustion carries a retry-after hint so callers can tell
//!   "try again later" apart from "this will never work"

pub mod backoff;
pub mod retries;

pub use retries::{classify, run_with_retry, AttemptClass, RetryPolicy};
