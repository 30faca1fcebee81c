//! # Dispatch Statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, one per delivery outcome.
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub delivered: AtomicU64,
    pub closed: AtomicU64,
    pub not_established: AtomicU64,
    pub other_errors: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchCounts {
    pub delivered: u64,
    pub closed: u64,
    pub not_established: u64,
    pub other_errors: u64,
}

impl DispatchCounts {
    pub fn attempted(&self) -> u64 {
        self.delivered + self.closed + self.not_established + self.other_errors
    }
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchCounts {
        DispatchCounts {
            delivered: self.delivered.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            not_established: self.not_established.load(Ordering::Relaxed),
            other_errors: self.other_errors.load(Ordering::Relaxed),
        }
    }
}
