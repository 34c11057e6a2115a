//! # Termination Counter
//!
//! Sum of the per-worker odd-phase activity flags for the current round.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Shared activity sum, read by every worker after the odd-phase barrier.
///
/// All accesses are relaxed: contributions happen before the odd-phase
/// barrier, reads after it, and the reset strictly between rearm and the
/// next contribution.
#[derive(Debug, Default)]
pub struct TerminationCounter {
    active: CachePadded<AtomicUsize>,
}

impl TerminationCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one worker's activity flag.
    #[inline]
    pub fn contribute(&self, swapped: bool) {
        self.active.fetch_add(usize::from(swapped), Ordering::Relaxed);
    }

    /// Number of workers that swapped during the last odd phase.
    #[inline]
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// True when no worker swapped during the last odd phase.
    #[inline]
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.active() == 0
    }

    /// Clears the sum for the next round.
    #[inline]
    pub fn reset(&self) {
        self.active.store(0, Ordering::Relaxed);
    }
}
