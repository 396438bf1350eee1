//! Supersession and cancellation tokens
//!
//! Plan builds are tagged with monotonically increasing tickets so a slow,
//! outdated build can never overwrite a newer one. Step engines carry a
//! cooperative cancel flag checked after every suspension point.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Identifier of one plan-build invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanTicket(u64);

impl fmt::Display for PlanTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues plan tickets and remembers the latest one
#[derive(Debug, Default)]
pub struct PlanRequestTracker {
    latest: AtomicU64,
}

impl PlanRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one
    pub fn issue(&self) -> PlanTicket {
        PlanTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> PlanTicket {
        PlanTicket(self.latest.load(Ordering::SeqCst))
    }

    #[inline]
    pub fn is_current(&self, ticket: PlanTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidate any in-flight build without starting a new one
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cooperative cancellation flag shared between the engine and the UI
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
