//! Proxy forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! RouteMatch + inbound request parts
//!     → headers.rs (drop hop-by-hop, drop Host)
//!     → forwarder.rs (build target URI, issue call, enforce timeout)
//!     → track.rs (in-flight guard, released on every exit path)
//!     → ProxyOutcome
//! ```
//!
//! # Design Decisions
//! - One shared connection pool (hyper client) across requests;
//!   per-request acquisition and release are the client's concern,
//!   cancellation aborts the in-flight call when the caller goes away
//! - Outcome taxonomy is the only error channel; the forwarder never
//!   fabricates a backend status code

pub mod forwarder;
pub mod headers;
pub mod track;

pub use forwarder::{Forwarder, ProxyOutcome};
pub use track::{InFlightGuard, InFlightTracker};
