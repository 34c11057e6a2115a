//! # Parallel-For Variant
//!
//! No partitions and no border cells: each phase is one data-parallel loop
//! over the pairs of the whole array, run on a fixed rayon pool.
//!
//! ```text
//!   even phase:  par_chunks_exact_mut(2)        ──▶ join
//!   odd phase:   [1..].par_chunks_exact_mut(2)  ──▶ OR of swap flags ──▶ join
//! ```
//!
//! `grain` is the minimum number of pairs one task handles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use crate::buffer::random_values;
use crate::config::SortConfig;
use crate::coordinator::{pin_current, pin_targets};
use crate::error::{SortError, SortResult};
use crate::kernel::compare_exchange;
use crate::metrics::{SortMetrics, SortOutcome};

/// Runs odd-even transposition sort as a pair of parallel loops per round.
#[derive(Debug)]
pub struct ParallelForSorter {
    config: SortConfig,
    pool: ThreadPool,
    pinned: Arc<AtomicUsize>,
}

impl ParallelForSorter {
    /// Validates the config and starts a pool of `config.workers` threads.
    ///
    /// # Errors
    ///
    /// - [`SortError::InvalidConfiguration`] if the config is invalid
    /// - [`SortError::ThreadCreationFailure`] if the pool cannot start
    pub fn new(config: SortConfig) -> SortResult<Self> {
        config.validate()?;

        let pinned = Arc::new(AtomicUsize::new(0));
        let cores = pin_targets(config.pin_threads);
        let counter = Arc::clone(&pinned);

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("oe-for-{i}"))
            .start_handler(move |i| pin_current(i, &cores, &counter))
            .build()
            .map_err(|e| SortError::ThreadCreationFailure {
                worker: 0,
                reason: e.to_string(),
            })?;

        Ok(Self {
            config,
            pool,
            pinned,
        })
    }

    /// The run configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Sorts the random array described by the config.
    ///
    /// # Errors
    ///
    /// See [`ParallelForSorter::sort_values`].
    pub fn run(&self) -> SortResult<SortOutcome> {
        let values = random_values(self.config.seed, self.config.length, self.config.max_value)?;
        self.sort_values(&values)
    }

    /// Sorts caller-provided values. `config.length` is ignored.
    ///
    /// The outcome carries no per-worker reports; pool threads are not
    /// bound to any part of the array.
    ///
    /// # Errors
    ///
    /// - [`SortError::InvalidConfiguration`] if fewer than two values are given
    /// - [`SortError::AlgorithmInvariantViolation`] if the round ceiling is hit
    pub fn sort_values(&self, values: &[i16]) -> SortResult<SortOutcome> {
        if values.len() < 2 {
            return Err(SortError::InvalidConfiguration(format!(
                "length {} is too short, need at least 2 elements",
                values.len()
            )));
        }

        let grain = self.config.grain;
        let ceiling = self.config.round_ceiling(values.len());
        let mut cells = values.to_vec();

        debug!(
            length = values.len(),
            threads = self.pool.current_num_threads(),
            grain,
            "starting parallel-for sort"
        );

        let start = Instant::now();
        let rounds = self.pool.install(|| {
            let mut rounds = 0u64;
            loop {
                rounds += 1;
                even_phase(&mut cells, grain);
                if !odd_phase(&mut cells, grain) {
                    return Ok(rounds);
                }
                if rounds >= ceiling {
                    warn!(rounds, ceiling, "parallel-for hit round ceiling");
                    return Err(SortError::AlgorithmInvariantViolation { rounds, ceiling });
                }
            }
        })?;
        let elapsed = start.elapsed();

        debug!(rounds, elapsed = ?elapsed, "parallel-for sort converged");

        Ok(SortOutcome {
            metrics: SortMetrics {
                rounds,
                elapsed,
                workers: self.pool.current_num_threads(),
                buffer_cells: cells.len(),
                padding_cells: 0,
                pinned_workers: self.pinned.load(Ordering::Relaxed),
                reports: Vec::new(),
            },
            buffer_before: self.config.capture_buffers.then(|| values.to_vec()),
            buffer_after: self.config.capture_buffers.then(|| cells.clone()),
            sorted: cells,
        })
    }
}

fn even_phase(cells: &mut [i16], grain: usize) {
    cells
        .par_chunks_exact_mut(2)
        .with_min_len(grain)
        .for_each(|pair| {
            if let [lo, hi] = pair {
                compare_exchange(lo, hi);
            }
        });
}

/// Every pair is visited; the flags are OR-ed, never short-circuited.
fn odd_phase(cells: &mut [i16], grain: usize) -> bool {
    let Some(tail) = cells.get_mut(1..) else {
        return false;
    };
    tail.par_chunks_exact_mut(2)
        .with_min_len(grain)
        .map(|pair| match pair {
            [lo, hi] => compare_exchange(lo, hi),
            _ => false,
        })
        .reduce(|| false, |a, b| a | b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential;

    fn sorter(workers: usize, grain: usize) -> ParallelForSorter {
        let config = SortConfig::new(0, 2, workers, 64)
            .with_grain(grain)
            .with_pinning(false);
        ParallelForSorter::new(config).unwrap()
    }

    #[test]
    fn test_phases_match_kernel() {
        let values: Vec<i16> = (0..37).map(|i| (i * 13) % 17).collect();
        let mut parallel = values.clone();
        let mut serial = values;

        even_phase(&mut parallel, 2);
        crate::kernel::even_pass(&mut serial);
        assert_eq!(parallel, serial);

        let a = odd_phase(&mut parallel, 2);
        let b = crate::kernel::odd_pass(&mut serial);
        assert_eq!(parallel, serial);
        assert_eq!(a, b);
    }

    #[test]
    fn test_matches_sequential_rounds() {
        let values = random_values(4, 600, 200).unwrap();
        let mut expected = values.clone();
        let timings = sequential::sort(&mut expected);

        for (workers, grain) in [(1, 1), (3, 1), (4, 16), (8, 1000)] {
            let outcome = sorter(workers, grain).sort_values(&values).unwrap();
            assert_eq!(outcome.sorted, expected, "workers {workers} grain {grain}");
            assert_eq!(outcome.metrics.rounds, timings.rounds);
            assert_eq!(outcome.metrics.workers, workers);
        }
    }

    #[test]
    fn test_odd_phase_visits_every_pair_after_a_swap() {
        // The first odd pair swaps; the last one must still be ordered.
        let mut cells = [0, 5, 1, 2, 9, 3];
        assert!(odd_phase(&mut cells, 1));
        assert_eq!(cells, [0, 1, 5, 2, 3, 9]);
    }

    #[test]
    fn test_rejects_single_value() {
        assert!(matches!(
            sorter(2, 1).sort_values(&[1]),
            Err(SortError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_round_ceiling() {
        let values: Vec<i16> = (0..100).rev().collect();
        let config = SortConfig::new(0, 100, 2, 64)
            .with_pinning(false)
            .with_max_rounds(4);
        assert!(matches!(
            ParallelForSorter::new(config).unwrap().sort_values(&values),
            Err(SortError::AlgorithmInvariantViolation { rounds: 4, ceiling: 4 })
        ));
    }

    #[test]
    fn test_capture_buffers() {
        let config = SortConfig::new(1, 50, 2, 64)
            .with_pinning(false)
            .with_capture_buffers(true);
        let outcome = ParallelForSorter::new(config).unwrap().run().unwrap();
        assert_eq!(outcome.buffer_before, Some(random_values(1, 50, i16::MAX).unwrap()));
        assert_eq!(outcome.buffer_after.as_ref(), Some(&outcome.sorted));
        assert_eq!(outcome.metrics.padding_cells, 0);
    }
}
