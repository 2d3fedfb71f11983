//! In-flight forward tracking.
//!
//! # Responsibilities
//! - Count downstream calls currently in flight
//! - Guarantee the count drops on every exit path, including
//!   cancellation when the caller disconnects
//!
//! # Design Decisions
//! - Guard-based: the count decrements when the guard drops, so an
//!   aborted forward releases its slot like a completed one

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tracks downstream calls in flight.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    count: Arc<AtomicU64>,
}

impl InFlightTracker {
    /// Create a tracker with zero in-flight calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a forward starting. Returns a guard that decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Current number of in-flight forwards.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

/// Guard for one in-flight forward.
#[derive(Debug)]
pub struct InFlightGuard {
    count: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}
