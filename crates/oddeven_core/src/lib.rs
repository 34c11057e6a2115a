//! # ODDEVEN Core
//!
//! Shared-memory parallel odd-even transposition sort.
//!
//! ## Design Principles
//!
//! 1. **Static partitions** - each worker owns one contiguous range for the whole run
//! 2. **No locks in the sort loop** - workers meet only at two reusable barriers per round
//! 3. **Border exchange, not queues** - neighbors trade one cell per phase through the buffer
//! 4. **Cache-line padding** - partitions never share a line
//!
//! ## Variants
//!
//! - [`Coordinator`] - barrier-driven pool (spin or blocking barriers)
//! - [`FarmSorter`] - master/worker over channels
//! - [`ParallelForSorter`] - one data-parallel loop per phase on a rayon pool
//! - [`sequential::sort`] - single-thread baseline
//! - [`sequential::sort_split`] - single-thread, separate even/odd vectors
//!
//! ## Example
//!
//! ```rust,ignore
//! use oddeven_core::{Coordinator, SortConfig};
//!
//! let config = SortConfig::new(1, 100_000, 8, 64).with_max_value(1000);
//! let outcome = Coordinator::new(config)?.run()?;
//! assert!(outcome.is_sorted());
//! println!("{} rounds in {} usecs", outcome.metrics.rounds, outcome.metrics.elapsed_micros());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod farm;
pub mod kernel;
pub mod metrics;
pub mod parallel_for;
pub mod partition;
pub mod sequential;
pub mod sync;
pub mod worker;

pub use buffer::{
    random_values, PaddedBufferBuilder, SharedBuffer, MAX_CACHE_LINE_BYTES, PADDING_SENTINEL,
};
pub use config::{SortConfig, WaitStrategy};
pub use coordinator::Coordinator;
pub use error::{SortError, SortResult};
pub use farm::{Command, FarmSorter, Phase, PhaseCollector, PhaseReport};
pub use metrics::{SortMetrics, SortOutcome};
pub use parallel_for::ParallelForSorter;
pub use partition::{assign_ranges, Range};
pub use sequential::{PhaseTimings, SplitVectors};
pub use sync::{BlockingBarrier, PhaseBarrier, SpinBarrier, StartGate, TerminationCounter};
pub use worker::{LocalPartition, Neighbors, SharedState, Worker, WorkerReport};
