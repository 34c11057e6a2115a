//! # Range Partitioning
//!
//! Splits `[0, m)` into one contiguous range per worker.
//!
//! ## Parity Rule
//!
//! Every range except the last ends on an odd logical index. Each range then
//! starts on an even index, so a worker's local pair offsets line up with the
//! global even/odd phases, and the only pair that crosses a boundary is an
//! odd-phase pair owned by the left worker.
//!
//! ```text
//! m = 10, nw = 3, span = 3
//!
//!   logical:  0 1 2 3 | 4 5 6 7 | 8 9
//!   worker:   0         1         2
//!             end 2 -> 3 (bumped), end 6 -> 7 (bumped), last ends at m-1
//! ```

use crate::error::{SortError, SortResult};

/// Contiguous slice of the logical array owned by one worker.
///
/// `start`/`end` are logical indices (inclusive). `local_start`/`size` are
/// filled in by the buffer builder and locate the range inside the padded
/// shared buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// First logical index (inclusive).
    pub start: usize,
    /// Last logical index (inclusive).
    pub end: usize,
    /// Offset of the range's first cell in the shared buffer.
    pub local_start: usize,
    /// Number of true elements this range reports at reconstruction.
    pub size: usize,
}

impl Range {
    /// Number of logical elements covered by the range.
    #[inline]
    #[must_use]
    pub const fn span(&self) -> usize {
        self.end - self.start + 1
    }

    /// Buffer index of the trailing cell (`local_start + size`).
    ///
    /// For every range but the last this is the successor-border cell.
    #[inline]
    #[must_use]
    pub const fn trailing_index(&self) -> usize {
        self.local_start + self.size
    }

    /// Number of buffer cells a worker works on (`size + 1`).
    #[inline]
    #[must_use]
    pub const fn working_len(&self) -> usize {
        self.size + 1
    }
}

/// Computes one range per worker for an array of length `m`.
///
/// # Errors
///
/// Returns [`SortError::InvalidConfiguration`] if `workers` is zero, `m < 2`,
/// `m < workers`, or if parity bumps would leave the final range with fewer
/// than two elements.
pub fn assign_ranges(m: usize, workers: usize) -> SortResult<Vec<Range>> {
    if workers == 0 {
        return Err(SortError::InvalidConfiguration(
            "worker count must be at least 1".to_string(),
        ));
    }
    if m < 2 {
        return Err(SortError::InvalidConfiguration(format!(
            "length {m} is too short, need at least 2 elements"
        )));
    }
    if m < workers {
        return Err(SortError::InvalidConfiguration(format!(
            "length {m} is smaller than worker count {workers}"
        )));
    }

    let span = m / workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0usize;

    for _ in 0..workers - 1 {
        let mut end = start + span - 1;
        if end % 2 == 0 {
            end += 1;
        }
        // The next range needs room for at least two elements.
        if end + 2 >= m {
            return Err(SortError::InvalidConfiguration(format!(
                "{workers} workers leave no room for the last range of a {m}-element array"
            )));
        }
        ranges.push(Range {
            start,
            end,
            ..Range::default()
        });
        start = end + 1;
    }

    ranges.push(Range {
        start,
        end: m - 1,
        ..Range::default()
    });

    Ok(ranges)
}
