//! # Two-Phase Barriers
//!
//! A barrier without a generation counter. Participants count the shared
//! counter down to signal "phase done" and back up to rearm it:
//!
//! ```text
//!   k = n ──decrement_and_wait──▶ k = 0 ──increment_and_wait──▶ k = n
//!          (all finished phase)          (all ready for next round)
//! ```
//!
//! Every one of the `n` participants must call both operations in matching
//! cycles. A missing participant deadlocks the rest.
//!
//! Reuse is safe without a generation counter because a worker always
//! crosses the *other* barrier between two operations on the same one, and
//! it cannot pass that barrier until every peer has left the first.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::{Backoff, CachePadded};
use parking_lot::{Condvar, Mutex};

/// The count-down / count-up protocol shared by both barrier flavours.
pub trait PhaseBarrier: Send + Sync {
    /// Fixed number of participants.
    fn participants(&self) -> usize;

    /// Decrements the counter, then waits until it reaches zero.
    fn decrement_and_wait(&self);

    /// Increments the counter, then waits until it reaches `participants`.
    fn increment_and_wait(&self);
}

/// Busy-wait barrier. Spins, then yields once the backoff is exhausted.
#[derive(Debug)]
pub struct SpinBarrier {
    count: CachePadded<AtomicUsize>,
    participants: usize,
}

impl SpinBarrier {
    /// Creates an armed barrier for `participants` threads.
    #[must_use]
    pub fn new(participants: NonZeroUsize) -> Self {
        let participants = participants.get();
        Self {
            count: CachePadded::new(AtomicUsize::new(participants)),
            participants,
        }
    }

    /// Current counter value (for diagnostics).
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    #[inline]
    fn wait_for(&self, target: usize) {
        let backoff = Backoff::new();
        while self.count.load(Ordering::Acquire) != target {
            backoff.snooze();
        }
    }
}

impl PhaseBarrier for SpinBarrier {
    #[inline]
    fn participants(&self) -> usize {
        self.participants
    }

    fn decrement_and_wait(&self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
        self.wait_for(0);
    }

    fn increment_and_wait(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
        self.wait_for(self.participants);
    }
}

/// Same protocol as [`SpinBarrier`], parked on a condvar instead of spinning.
///
/// Useful when workers outnumber hardware threads.
#[derive(Debug)]
pub struct BlockingBarrier {
    count: Mutex<usize>,
    changed: Condvar,
    participants: usize,
}

impl BlockingBarrier {
    /// Creates an armed barrier for `participants` threads.
    #[must_use]
    pub fn new(participants: NonZeroUsize) -> Self {
        let participants = participants.get();
        Self {
            count: Mutex::new(participants),
            changed: Condvar::new(),
            participants,
        }
    }

    /// Current counter value (for diagnostics).
    #[must_use]
    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    fn step_and_wait(&self, step: impl FnOnce(&mut usize), target: usize) {
        let mut count = self.count.lock();
        step(&mut count);
        if *count == target {
            self.changed.notify_all();
            return;
        }
        while *count != target {
            self.changed.wait(&mut count);
        }
    }
}

impl PhaseBarrier for BlockingBarrier {
    #[inline]
    fn participants(&self) -> usize {
        self.participants
    }

    fn decrement_and_wait(&self) {
        self.step_and_wait(|k| *k -= 1, 0);
    }

    fn increment_and_wait(&self) {
        self.step_and_wait(|k| *k += 1, self.participants);
    }
}
