//! # Run Metrics
//!
//! Everything a run reports back, returned by value. No global counters.

use std::time::Duration;

use crate::worker::WorkerReport;

/// Statistics for one parallel run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortMetrics {
    /// Rounds until convergence (one even plus one odd phase each).
    pub rounds: u64,
    /// Wall-clock time from first spawn to last join.
    pub elapsed: Duration,
    /// Number of workers.
    pub workers: usize,
    /// Cells in the shared buffer, padding included.
    pub buffer_cells: usize,
    /// Padding cells in the shared buffer.
    pub padding_cells: usize,
    /// Workers that were successfully pinned to a hardware thread.
    pub pinned_workers: usize,
    /// Per-worker reports, in worker order.
    pub reports: Vec<WorkerReport>,
}

impl SortMetrics {
    /// Elapsed time in whole microseconds.
    #[inline]
    #[must_use]
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }
}

/// Result of a successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortOutcome {
    /// The reconstructed logical sequence.
    pub sorted: Vec<i16>,
    /// Run statistics.
    pub metrics: SortMetrics,
    /// Raw buffer before the run, if capture was enabled.
    pub buffer_before: Option<Vec<i16>>,
    /// Raw buffer after the run, if capture was enabled.
    pub buffer_after: Option<Vec<i16>>,
}

impl SortOutcome {
    /// True if `sorted` is in ascending order.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted.windows(2).all(|w| w[0] <= w[1])
    }
}
