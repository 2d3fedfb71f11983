//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (normalize, split into segments)
//!     → router.rs (longest-prefix lookup, forward path, public check)
//!     → Return: RouteMatch or None
//!
//! Route compilation (at startup):
//!     RouteConfig[] + PublicPathConfig[]
//!     → Pre-split prefixes into segments
//!     → Sort longest prefix first (stable)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Matching and stripping operate on whole segments only
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{PublicPathSet, RouteMatch, RouteTable};
