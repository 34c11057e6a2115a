//! # Farm Variant
//!
//! Same kernel and border exchange as the barrier pool, but phases are
//! dispatched as messages by a master instead of agreed on at barriers:
//!
//! ```text
//!                ┌──── Command ────▶ worker 0 ──┐
//!   master ──────┼──── Command ────▶ worker 1 ──┼──── PhaseReport ────▶ master
//!  (collector)   └──── Command ────▶ worker N ──┘
//! ```
//!
//! The master fans a phase out to every worker, waits until every worker
//! has reported, then dispatches the next phase or terminates. Channel
//! send/receive orders the border writes of one phase before the reads of
//! the next.

use std::sync::atomic::AtomicUsize;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::buffer::{random_values, PaddedBufferBuilder, SharedBuffer};
use crate::config::SortConfig;
use crate::coordinator::{join_reports, pin_current, pin_targets};
use crate::error::{SortError, SortResult};
use crate::metrics::{SortMetrics, SortOutcome};
use crate::partition::assign_ranges;
use crate::worker::{LocalPartition, Neighbors, WorkerReport};

/// Which pass a phase runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Pairs starting at even offsets.
    Even,
    /// Pairs starting at odd offsets.
    Odd,
}

/// Message from the master to a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the even pass.
    EvenPhase,
    /// Run the odd pass.
    OddPhase,
    /// Write back and exit.
    Terminate,
}

impl Command {
    /// Command that starts `phase`.
    #[must_use]
    pub const fn start(phase: Phase) -> Self {
        match phase {
            Phase::Even => Self::EvenPhase,
            Phase::Odd => Self::OddPhase,
        }
    }
}

/// Message from a worker back to the master.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseReport {
    /// Reporting worker.
    pub worker: usize,
    /// Phase that just finished.
    pub phase: Phase,
    /// Whether the phase inverted any pair. Always false for even phases.
    pub activity: bool,
}

/// What the master does after recording a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Reports for the current phase are still outstanding.
    Wait,
    /// Send this command to every worker.
    Dispatch(Command),
    /// An odd phase finished quiet: the array is sorted.
    Converged,
    /// The round ceiling was reached without convergence.
    Exhausted,
}

/// Counts reports and decides phase transitions.
///
/// Activity is summed per phase and reset when the phase switches, so only
/// the odd phase decides termination, exactly like the barrier counter.
#[derive(Clone, Debug)]
pub struct PhaseCollector {
    workers: usize,
    outstanding: usize,
    activity: usize,
    phase: Phase,
    rounds: u64,
    ceiling: u64,
}

impl PhaseCollector {
    /// Collector for `workers` workers, starting with an even phase in
    /// flight.
    #[must_use]
    pub fn new(workers: usize, ceiling: u64) -> Self {
        Self {
            workers,
            outstanding: workers,
            activity: 0,
            phase: Phase::Even,
            rounds: 0,
            ceiling,
        }
    }

    /// Phase currently in flight.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed rounds.
    #[inline]
    #[must_use]
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Records one report and returns what to do next.
    pub fn record(&mut self, report: PhaseReport) -> Decision {
        debug_assert_eq!(report.phase, self.phase);
        self.activity += usize::from(report.activity);
        self.outstanding -= 1;
        if self.outstanding > 0 {
            return Decision::Wait;
        }

        let quiet = self.activity == 0;
        self.activity = 0;
        self.outstanding = self.workers;

        match self.phase {
            Phase::Even => {
                self.phase = Phase::Odd;
                Decision::Dispatch(Command::OddPhase)
            }
            Phase::Odd => {
                self.rounds += 1;
                if quiet {
                    Decision::Converged
                } else if self.rounds >= self.ceiling {
                    Decision::Exhausted
                } else {
                    self.phase = Phase::Even;
                    Decision::Dispatch(Command::EvenPhase)
                }
            }
        }
    }
}

/// One worker node of the farm.
struct FarmWorker<'a> {
    id: usize,
    partition: LocalPartition<'a>,
    buffer: &'a SharedBuffer,
    commands: Receiver<Command>,
    reports: Sender<PhaseReport>,
}

impl FarmWorker<'_> {
    fn run(mut self) -> WorkerReport {
        let mut report = WorkerReport {
            id: self.id,
            ..WorkerReport::default()
        };

        // A disconnected command channel means the master gave up.
        while let Ok(command) = self.commands.recv() {
            let (phase, activity) = match command {
                Command::EvenPhase => {
                    self.partition.even_phase(self.buffer);
                    (Phase::Even, false)
                }
                Command::OddPhase => {
                    report.rounds += 1;
                    let swapped = self.partition.odd_phase(self.buffer);
                    report.active_rounds += u64::from(swapped);
                    (Phase::Odd, swapped)
                }
                Command::Terminate => break,
            };
            let sent = self.reports.send(PhaseReport {
                worker: self.id,
                phase,
                activity,
            });
            if sent.is_err() {
                break;
            }
        }

        self.partition.write_back(self.buffer);
        report
    }
}

/// Runs the message-driven master/worker sort.
#[derive(Clone, Debug)]
pub struct FarmSorter {
    config: SortConfig,
}

impl FarmSorter {
    /// Creates a farm sorter for a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] if the config is invalid.
    pub fn new(config: SortConfig) -> SortResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Sorts the random array described by the config.
    ///
    /// # Errors
    ///
    /// See [`FarmSorter::sort_values`].
    pub fn run(&self) -> SortResult<SortOutcome> {
        let values = random_values(self.config.seed, self.config.length, self.config.max_value)?;
        self.sort_values(&values)
    }

    /// Sorts caller-provided values. `config.length` is ignored.
    ///
    /// # Errors
    ///
    /// - [`SortError::InvalidConfiguration`] for an unusable layout
    /// - [`SortError::ThreadCreationFailure`] if a worker cannot be spawned
    /// - [`SortError::ChannelClosed`] if a worker vanishes mid-run
    /// - [`SortError::WorkerPanicked`] if a worker panics
    /// - [`SortError::AlgorithmInvariantViolation`] if the round ceiling is hit
    pub fn sort_values(&self, values: &[i16]) -> SortResult<SortOutcome> {
        let mut ranges = assign_ranges(values.len(), self.config.workers)?;
        let buffer =
            PaddedBufferBuilder::new(self.config.cache_line_bytes)?.build(values, &mut ranges)?;
        let ceiling = self.config.round_ceiling(values.len());
        let cores = pin_targets(self.config.pin_threads);
        let pinned = AtomicUsize::new(0);
        let buffer_before = self.config.capture_buffers.then(|| buffer.snapshot());

        debug!(
            length = values.len(),
            workers = ranges.len(),
            buffer_cells = buffer.len(),
            "starting farm sort"
        );

        let start = Instant::now();

        let (rounds, reports) = thread::scope(|s| {
            let (report_tx, report_rx) = unbounded();
            let mut command_txs = Vec::with_capacity(ranges.len());
            let mut handles = Vec::with_capacity(ranges.len());

            for (id, range) in ranges.iter().enumerate() {
                let (command_tx, command_rx) = unbounded();
                let worker = FarmWorker {
                    id,
                    partition: LocalPartition::load(&buffer, range, Neighbors::of(&ranges, id)),
                    buffer: &buffer,
                    commands: command_rx,
                    reports: report_tx.clone(),
                };
                let (pinned, cores) = (&pinned, cores.as_slice());

                let spawned = thread::Builder::new()
                    .name(format!("oe-farm-{id}"))
                    .spawn_scoped(s, move || -> SortResult<WorkerReport> {
                        pin_current(id, cores, pinned);
                        Ok(worker.run())
                    });

                match spawned {
                    // Dropping `command_txs` on return disconnects the
                    // workers already spawned.
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        return Err(SortError::ThreadCreationFailure {
                            worker: id,
                            reason: e.to_string(),
                        })
                    }
                }
                command_txs.push(command_tx);
            }
            drop(report_tx);

            let outcome = master(&command_txs, &report_rx, ranges.len(), ceiling);
            drop(command_txs);

            // A panicked worker outranks the master's view of the same failure.
            let reports = join_reports(handles)?;
            outcome.map(|rounds| (rounds, reports))
        })?;

        let elapsed = start.elapsed();
        debug!(rounds, elapsed = ?elapsed, "farm sort converged");

        Ok(SortOutcome {
            sorted: buffer.reconstruct(&ranges),
            metrics: SortMetrics {
                rounds,
                elapsed,
                workers: ranges.len(),
                buffer_cells: buffer.len(),
                padding_cells: buffer.padding_cells(),
                pinned_workers: pinned.into_inner(),
                reports,
            },
            buffer_before,
            buffer_after: self.config.capture_buffers.then(|| buffer.snapshot()),
        })
    }
}

fn broadcast(command_txs: &[Sender<Command>], command: Command) -> SortResult<()> {
    for tx in command_txs {
        tx.send(command).map_err(|_| SortError::ChannelClosed)?;
    }
    Ok(())
}

/// Drives phases until convergence. Returns the number of rounds.
fn master(
    command_txs: &[Sender<Command>],
    reports: &Receiver<PhaseReport>,
    workers: usize,
    ceiling: u64,
) -> SortResult<u64> {
    let mut collector = PhaseCollector::new(workers, ceiling);
    broadcast(command_txs, Command::start(collector.phase()))?;

    loop {
        let report = reports.recv().map_err(|_| SortError::ChannelClosed)?;
        match collector.record(report) {
            Decision::Wait => {}
            Decision::Dispatch(command) => broadcast(command_txs, command)?,
            Decision::Converged => {
                broadcast(command_txs, Command::Terminate)?;
                return Ok(collector.rounds());
            }
            Decision::Exhausted => {
                warn!(rounds = collector.rounds(), ceiling, "farm hit round ceiling");
                broadcast(command_txs, Command::Terminate)?;
                return Err(SortError::AlgorithmInvariantViolation {
                    rounds: collector.rounds(),
                    ceiling,
                });
            }
        }
    }
}
