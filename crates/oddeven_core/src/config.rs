//! # Sort Configuration
//!
//! Parameters for one run. Built from CLI arguments or loaded from TOML
//! once at startup:
//!
//! ```toml
//! seed = 1
//! length = 100000
//! workers = 8
//! cache_line_bytes = 64
//! max_value = 1000
//! wait_strategy = "blocking"
//! ```

use serde::{Deserialize, Serialize};

use crate::buffer::{CELL_BYTES, DEFAULT_CACHE_LINE_BYTES, MAX_CACHE_LINE_BYTES};
use crate::error::{SortError, SortResult};

/// How workers wait at the phase barriers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Busy-wait with backoff.
    #[default]
    Spin,
    /// Park on a condvar.
    Blocking,
}

/// Configuration for a sort run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Seed for the random initial array.
    pub seed: u64,
    /// Number of elements.
    pub length: usize,
    /// Number of worker threads.
    pub workers: usize,
    /// Cache line size used for padding between partitions.
    pub cache_line_bytes: usize,
    /// Exclusive upper bound of generated values.
    pub max_value: i16,
    /// Barrier flavour.
    pub wait_strategy: WaitStrategy,
    /// Pin worker `i` to hardware thread `i mod cores`.
    pub pin_threads: bool,
    /// Minimum pairs per task in the parallel-for variant.
    pub grain: usize,
    /// Round ceiling. `None` means `length + 2`.
    pub max_rounds: Option<u64>,
    /// Keep raw buffer snapshots from before and after the run.
    pub capture_buffers: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            length: 1024,
            workers: 1,
            cache_line_bytes: DEFAULT_CACHE_LINE_BYTES,
            max_value: i16::MAX,
            wait_strategy: WaitStrategy::Spin,
            pin_threads: true,
            grain: 1,
            max_rounds: None,
            capture_buffers: false,
        }
    }
}

impl SortConfig {
    /// Creates a config with the positional CLI parameters.
    #[must_use]
    pub fn new(seed: u64, length: usize, workers: usize, cache_line_bytes: usize) -> Self {
        Self {
            seed,
            length,
            workers,
            cache_line_bytes,
            ..Self::default()
        }
    }

    /// Sets the exclusive upper bound of generated values.
    #[must_use]
    pub const fn with_max_value(mut self, max_value: i16) -> Self {
        self.max_value = max_value;
        self
    }

    /// Sets the barrier flavour.
    #[must_use]
    pub const fn with_wait_strategy(mut self, wait_strategy: WaitStrategy) -> Self {
        self.wait_strategy = wait_strategy;
        self
    }

    /// Enables or disables thread pinning.
    #[must_use]
    pub const fn with_pinning(mut self, pin_threads: bool) -> Self {
        self.pin_threads = pin_threads;
        self
    }

    /// Sets the parallel-for grain.
    #[must_use]
    pub const fn with_grain(mut self, grain: usize) -> Self {
        self.grain = grain;
        self
    }

    /// Sets an explicit round ceiling.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Keeps raw buffer snapshots in the outcome.
    #[must_use]
    pub const fn with_capture_buffers(mut self, capture: bool) -> Self {
        self.capture_buffers = capture;
        self
    }

    /// Parses a config from TOML text. Missing keys take default values.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] on malformed TOML or if
    /// the parsed values fail [`SortConfig::validate`].
    pub fn from_toml_str(text: &str) -> SortResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| SortError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the scalar parameters.
    ///
    /// Length/worker compatibility is checked by the range partitioner,
    /// which knows the exact parity-adjusted layout.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] describing the first bad
    /// parameter.
    pub fn validate(&self) -> SortResult<()> {
        if self.workers == 0 {
            return Err(SortError::InvalidConfiguration(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.length < 2 {
            return Err(SortError::InvalidConfiguration(format!(
                "length {} is too short, need at least 2 elements",
                self.length
            )));
        }
        if !(CELL_BYTES..=MAX_CACHE_LINE_BYTES).contains(&self.cache_line_bytes) {
            return Err(SortError::InvalidConfiguration(format!(
                "cache line of {} bytes is outside {CELL_BYTES}..={MAX_CACHE_LINE_BYTES}",
                self.cache_line_bytes
            )));
        }
        if self.grain == 0 {
            return Err(SortError::InvalidConfiguration(
                "grain must be at least 1".to_string(),
            ));
        }
        if self.max_value < 1 {
            return Err(SortError::InvalidConfiguration(format!(
                "max value must be at least 1, got {}",
                self.max_value
            )));
        }
        if self.max_rounds == Some(0) {
            return Err(SortError::InvalidConfiguration(
                "round ceiling must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Round ceiling for an array of `m` elements.
    ///
    /// Odd-even transposition sort needs at most `m` phases, i.e.
    /// `ceil(m / 2)` rounds, plus one quiet round to notice.
    #[must_use]
    pub fn round_ceiling(&self, m: usize) -> u64 {
        self.max_rounds.unwrap_or(m as u64 + 2)
    }
}
