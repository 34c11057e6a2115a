//! # Barrier-Driven Worker
//!
//! Each worker owns one [`Range`] and a private working copy of its
//! `size + 1` buffer cells. The hot loop never touches shared memory except
//! for the two border cells it trades with its neighbors:
//!
//! ```text
//!              left neighbor                 this worker               right neighbor
//!        ... ┌────────┬──────┐        ┌──────┬──────────┬──────┐        ┌──────┬─────── ...
//!            │  true  │ next │──even─▶│ dup  │   true   │ next │◀──odd──│ dup  │  true
//!            └────────┴──────┘        └──────┴──────────┴──────┘        └──────┴─────── ...
//! ```
//!
//! Before the even phase the leading cell is refreshed from the left
//! neighbor's trailing cell; before the odd phase the trailing cell is
//! refreshed from the right neighbor's leading cell.

use tracing::{trace, warn};

use crate::buffer::SharedBuffer;
use crate::error::{SortError, SortResult};
use crate::kernel::{even_pass, odd_pass};
use crate::partition::Range;
use crate::sync::{PhaseBarrier, TerminationCounter};

/// State every worker of one run shares.
#[derive(Debug)]
pub struct SharedState<B> {
    /// The padded buffer.
    pub buffer: SharedBuffer,
    /// Barrier crossed after the even phase.
    pub even_barrier: B,
    /// Barrier crossed after the odd phase.
    pub odd_barrier: B,
    /// Odd-phase activity sum.
    pub termination: TerminationCounter,
}

impl<B: PhaseBarrier> SharedState<B> {
    /// Wraps a buffer with fresh barriers built by `make_barrier`.
    pub fn new(buffer: SharedBuffer, make_barrier: impl Fn() -> B) -> Self {
        Self {
            buffer,
            even_barrier: make_barrier(),
            odd_barrier: make_barrier(),
            termination: TerminationCounter::new(),
        }
    }
}

/// Read-only view of the ranges adjacent to a worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neighbors<'a> {
    /// Range of worker `id - 1`.
    pub left: Option<&'a Range>,
    /// Range of worker `id + 1`.
    pub right: Option<&'a Range>,
}

impl<'a> Neighbors<'a> {
    /// Neighbors of worker `id` in `ranges`.
    #[must_use]
    pub fn of(ranges: &'a [Range], id: usize) -> Self {
        Self {
            left: id.checked_sub(1).and_then(|i| ranges.get(i)),
            right: ranges.get(id + 1),
        }
    }
}

/// A worker's private copy of its cells plus the border exchange logic.
///
/// Shared by the barrier worker and the farm worker; only the transport
/// that orders the phases differs.
#[derive(Debug)]
pub struct LocalPartition<'a> {
    range: &'a Range,
    neighbors: Neighbors<'a>,
    cells: Vec<i16>,
}

impl<'a> LocalPartition<'a> {
    /// Copies the range's cells out of the shared buffer.
    #[must_use]
    pub fn load(buffer: &SharedBuffer, range: &'a Range, neighbors: Neighbors<'a>) -> Self {
        let mut cells = vec![0; range.working_len()];
        buffer.copy_out(range.local_start, &mut cells);
        Self {
            range,
            neighbors,
            cells,
        }
    }

    /// The owned range.
    #[inline]
    #[must_use]
    pub fn range(&self) -> &Range {
        self.range
    }

    /// Working cells (`size + 1` of them).
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[i16] {
        &self.cells
    }

    /// Refreshes the leading cell from the left neighbor, runs the even
    /// pass, and publishes the leading cell for the left neighbor's odd
    /// phase.
    pub fn even_phase(&mut self, buffer: &SharedBuffer) {
        if let Some(left) = self.neighbors.left {
            self.cells[0] = buffer.load(left.trailing_index());
        }
        even_pass(&mut self.cells);
        if self.neighbors.left.is_some() {
            buffer.store(self.range.local_start, self.cells[0]);
        }
    }

    /// Refreshes the trailing cell from the right neighbor, runs the odd
    /// pass, and publishes the trailing cell for the right neighbor's next
    /// even phase. Returns true if any pair was inverted.
    pub fn odd_phase(&mut self, buffer: &SharedBuffer) -> bool {
        let size = self.range.size;
        if let Some(right) = self.neighbors.right {
            self.cells[size] = buffer.load(right.local_start);
        }
        let swapped = odd_pass(&mut self.cells);
        if self.neighbors.right.is_some() {
            buffer.store(self.range.trailing_index(), self.cells[size]);
        }
        swapped
    }

    /// Copies the working cells back into the shared buffer.
    pub fn write_back(&self, buffer: &SharedBuffer) {
        buffer.copy_in(self.range.local_start, &self.cells);
    }
}

/// What a worker did before it exited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index.
    pub id: usize,
    /// Rounds executed (one even plus one odd phase each).
    pub rounds: u64,
    /// Rounds in which this worker's odd phase swapped something.
    pub active_rounds: u64,
}

/// One member of the barrier-synchronized pool.
pub struct Worker<'a, B> {
    id: usize,
    partition: LocalPartition<'a>,
    shared: &'a SharedState<B>,
    round_ceiling: u64,
}

impl<'a, B: PhaseBarrier> Worker<'a, B> {
    /// Binds worker `id` to `range`, loading its working copy.
    #[must_use]
    pub fn new(
        id: usize,
        range: &'a Range,
        neighbors: Neighbors<'a>,
        shared: &'a SharedState<B>,
        round_ceiling: u64,
    ) -> Self {
        Self {
            id,
            partition: LocalPartition::load(&shared.buffer, range, neighbors),
            shared,
            round_ceiling,
        }
    }

    /// Worker index.
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs rounds until the pool converges, then writes the cells back.
    ///
    /// Only odd-phase activity counts toward termination. After an even
    /// pass every even pair is ordered, so an odd pass with no swaps
    /// anywhere means every adjacent pair is ordered.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::AlgorithmInvariantViolation`] if the round
    /// ceiling is reached. Every worker reads the same round count and
    /// counter, so the whole pool bails out together.
    pub fn run(mut self) -> SortResult<WorkerReport> {
        let shared = self.shared;
        let mut report = WorkerReport {
            id: self.id,
            ..WorkerReport::default()
        };

        loop {
            report.rounds += 1;

            self.partition.even_phase(&shared.buffer);
            shared.even_barrier.decrement_and_wait();

            let swapped = self.partition.odd_phase(&shared.buffer);
            report.active_rounds += u64::from(swapped);
            shared.termination.contribute(swapped);
            shared.odd_barrier.decrement_and_wait();

            if shared.termination.is_quiescent() {
                break;
            }
            if report.rounds >= self.round_ceiling {
                self.partition.write_back(&shared.buffer);
                if self.id == 0 {
                    warn!(
                        rounds = report.rounds,
                        ceiling = self.round_ceiling,
                        "round ceiling reached without convergence"
                    );
                }
                return Err(SortError::AlgorithmInvariantViolation {
                    rounds: report.rounds,
                    ceiling: self.round_ceiling,
                });
            }

            shared.even_barrier.increment_and_wait();
            shared.odd_barrier.increment_and_wait();
            // Every worker has read the counter, and none can add to it
            // before all of them pass the next even barrier.
            shared.termination.reset();
        }

        self.partition.write_back(&shared.buffer);
        trace!(
            worker = self.id,
            rounds = report.rounds,
            active_rounds = report.active_rounds,
            "worker converged"
        );
        Ok(report)
    }
}
