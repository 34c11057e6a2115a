//! # Coordinator
//!
//! Owns one run of the barrier-driven sort:
//!
//! 1. Partition `[0, m)` and lay out the padded shared buffer
//! 2. Spawn one named, optionally pinned, thread per worker
//! 3. Open the start gate once every worker exists
//! 4. Join, then rebuild the logical sequence from the buffer
//!
//! The buffer, barriers and range table live on this stack frame; workers
//! borrow them through a thread scope, and everything is released when the
//! run returns.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use core_affinity::CoreId;
use tracing::{debug, trace};

use crate::buffer::{random_values, PaddedBufferBuilder};
use crate::config::{SortConfig, WaitStrategy};
use crate::error::{SortError, SortResult};
use crate::metrics::{SortMetrics, SortOutcome};
use crate::partition::{assign_ranges, Range};
use crate::sync::{BlockingBarrier, PhaseBarrier, SpinBarrier, StartGate};
use crate::worker::{Neighbors, SharedState, Worker, WorkerReport};

/// Hardware threads to pin to, or an empty list when pinning is off or
/// unsupported.
pub(crate) fn pin_targets(enabled: bool) -> Vec<CoreId> {
    if enabled {
        core_affinity::get_core_ids().unwrap_or_default()
    } else {
        Vec::new()
    }
}

/// Best-effort pin of the calling thread. Failure is only logged.
pub(crate) fn pin_current(worker: usize, cores: &[CoreId], pinned: &AtomicUsize) {
    if cores.is_empty() {
        return;
    }
    let core = cores[worker % cores.len()];
    if core_affinity::set_for_current(core) {
        pinned.fetch_add(1, Ordering::Relaxed);
    } else {
        trace!(worker, core = core.id, "thread pinning failed");
    }
}

/// Runs the barrier-driven parallel sort.
#[derive(Clone, Debug)]
pub struct Coordinator {
    config: SortConfig,
}

impl Coordinator {
    /// Creates a coordinator for a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] if the config is invalid.
    pub fn new(config: SortConfig) -> SortResult<Self> {
        config.validate()?;
        Ok(Self { config })
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
    /// See [`Coordinator::sort_values`].
    pub fn run(&self) -> SortResult<SortOutcome> {
        let values = random_values(self.config.seed, self.config.length, self.config.max_value)?;
        self.sort_values(&values)
    }

    /// Sorts caller-provided values. `config.length` is ignored.
    ///
    /// # Errors
    ///
    /// - [`SortError::InvalidConfiguration`] if the worker count does not fit
    ///   `values.len()`
    /// - [`SortError::ThreadCreationFailure`] if a worker cannot be spawned
    /// - [`SortError::WorkerPanicked`] if a worker panics
    /// - [`SortError::AlgorithmInvariantViolation`] if the round ceiling is hit
    pub fn sort_values(&self, values: &[i16]) -> SortResult<SortOutcome> {
        let mut ranges = assign_ranges(values.len(), self.config.workers)?;
        let buffer =
            PaddedBufferBuilder::new(self.config.cache_line_bytes)?.build(values, &mut ranges)?;
        let workers = NonZeroUsize::new(ranges.len()).ok_or_else(|| {
            SortError::InvalidConfiguration("worker count must be at least 1".to_string())
        })?;

        match self.config.wait_strategy {
            WaitStrategy::Spin => {
                self.execute(&ranges, &SharedState::new(buffer, || SpinBarrier::new(workers)))
            }
            WaitStrategy::Blocking => self.execute(
                &ranges,
                &SharedState::new(buffer, || BlockingBarrier::new(workers)),
            ),
        }
    }

    fn execute<B: PhaseBarrier>(
        &self,
        ranges: &[Range],
        shared: &SharedState<B>,
    ) -> SortResult<SortOutcome> {
        let m = ranges.last().map_or(0, |r| r.end + 1);
        let ceiling = self.config.round_ceiling(m);
        let cores = pin_targets(self.config.pin_threads);
        let buffer_before = self.config.capture_buffers.then(|| shared.buffer.snapshot());

        debug!(
            length = m,
            workers = ranges.len(),
            buffer_cells = shared.buffer.len(),
            padding_cells = shared.buffer.padding_cells(),
            wait_strategy = ?self.config.wait_strategy,
            "starting barrier sort"
        );

        let gate = StartGate::new();
        let pinned = AtomicUsize::new(0);
        let start = Instant::now();

        let joined = thread::scope(|s| {
            let mut handles = Vec::with_capacity(ranges.len());

            for (id, range) in ranges.iter().enumerate() {
                let worker = Worker::new(id, range, Neighbors::of(ranges, id), shared, ceiling);
                let (gate, pinned, cores) = (&gate, &pinned, cores.as_slice());

                let spawned = thread::Builder::new()
                    .name(format!("oe-worker-{id}"))
                    .spawn_scoped(s, move || launch(worker, gate, cores, pinned));

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        gate.abort();
                        return Err(SortError::ThreadCreationFailure {
                            worker: id,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            gate.open();
            join_reports(handles)
        });

        let elapsed = start.elapsed();
        let reports = joined?;
        let rounds = reports.first().map_or(0, |r| r.rounds);
        debug_assert!(reports.iter().all(|r| r.rounds == rounds));

        debug!(rounds, elapsed = ?elapsed, "barrier sort converged");

        Ok(SortOutcome {
            sorted: shared.buffer.reconstruct(ranges),
            metrics: SortMetrics {
                rounds,
                elapsed,
                workers: ranges.len(),
                buffer_cells: shared.buffer.len(),
                padding_cells: shared.buffer.padding_cells(),
                pinned_workers: pinned.load(Ordering::Relaxed),
                reports,
            },
            buffer_before,
            buffer_after: self.config.capture_buffers.then(|| shared.buffer.snapshot()),
        })
    }
}

/// Worker thread body: waits for the whole pool to exist, pins, runs.
fn launch<B: PhaseBarrier>(
    worker: Worker<'_, B>,
    gate: &StartGate,
    cores: &[CoreId],
    pinned: &AtomicUsize,
) -> SortResult<WorkerReport> {
    let id = worker.id();
    if !gate.wait() {
        return Err(SortError::ThreadCreationFailure {
            worker: id,
            reason: "pool start aborted".to_string(),
        });
    }
    pin_current(id, cores, pinned);
    worker.run()
}

/// Joins every worker, keeping the first error in worker order.
pub(crate) fn join_reports(
    handles: Vec<thread::ScopedJoinHandle<'_, SortResult<WorkerReport>>>,
) -> SortResult<Vec<WorkerReport>> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut first_error = None;

    for (id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(_) => {
                first_error.get_or_insert(SortError::WorkerPanicked(id));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}
