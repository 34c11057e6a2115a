//! # Padded Shared Buffer
//!
//! One flat buffer holds every partition, its duplicated border cells and
//! cache-line padding:
//!
//! ```text
//!   partition 0             partition 1                  partition 2 (last)
//! ┌───────────────┬───┬───┬───┬───────────────┬───┬───┬───┬──────────────┐
//! │ v0 .. v3      │v4 │pad│v4'│ v5 .. v7      │v8 │pad│v8'│ v9           │
//! └───────────────┴───┴───┴───┴───────────────┴───┴───┴───┴──────────────┘
//!   true elements  next      dup                next      dup
//! ```
//!
//! The trailing "next" cell of partition `i` is authoritative for the first
//! logical element of partition `i + 1`; the leading duplicate of partition
//! `i + 1` is refreshed from it at every even phase.
//!
//! Cells are `AtomicI16` accessed with relaxed ordering. Workers hot-loop on
//! private copies and only touch border cells concurrently; the barriers
//! order those accesses.

use std::sync::atomic::{AtomicI16, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{SortError, SortResult};
use crate::partition::Range;

/// Value stored in padding cells. Never read back as data.
pub const PADDING_SENTINEL: i16 = -1;

/// Width of one buffer cell in bytes.
pub const CELL_BYTES: usize = std::mem::size_of::<i16>();

/// Default cache line size used when none is configured.
pub const DEFAULT_CACHE_LINE_BYTES: usize = 64;

/// Widest cache line accepted. Bounds the padding per partition.
pub const MAX_CACHE_LINE_BYTES: usize = 4096;

/// Draws `m` values uniformly from `[0, max)`, in logical order.
///
/// The sequence depends only on `seed`, `m` and `max`, never on how the
/// array is later partitioned.
///
/// # Errors
///
/// Returns [`SortError::InvalidConfiguration`] if `max < 1`.
pub fn random_values(seed: u64, m: usize, max: i16) -> SortResult<Vec<i16>> {
    if max < 1 {
        return Err(SortError::InvalidConfiguration(format!(
            "max value must be at least 1, got {max}"
        )));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok((0..m).map(|_| rng.gen_range(0..max)).collect())
}

/// The shared flat buffer all workers operate on.
pub struct SharedBuffer {
    cells: Box<[AtomicI16]>,
    padding: usize,
}

impl SharedBuffer {
    /// Total number of cells, padding included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the buffer holds no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of padding cells.
    #[inline]
    #[must_use]
    pub const fn padding_cells(&self) -> usize {
        self.padding
    }

    /// Reads one cell.
    #[inline]
    #[must_use]
    pub fn load(&self, index: usize) -> i16 {
        self.cells[index].load(Ordering::Relaxed)
    }

    /// Writes one cell.
    #[inline]
    pub fn store(&self, index: usize, value: i16) {
        self.cells[index].store(value, Ordering::Relaxed);
    }

    /// Copies `dst.len()` cells starting at `start` into `dst`.
    pub fn copy_out(&self, start: usize, dst: &mut [i16]) {
        let end = start + dst.len();
        for (slot, cell) in dst.iter_mut().zip(&self.cells[start..end]) {
            *slot = cell.load(Ordering::Relaxed);
        }
    }

    /// Copies `src` into the cells starting at `start`.
    pub fn copy_in(&self, start: usize, src: &[i16]) {
        for (cell, &value) in self.cells[start..start + src.len()].iter().zip(src) {
            cell.store(value, Ordering::Relaxed);
        }
    }

    /// Raw contents, padding and duplicates included.
    #[must_use]
    pub fn snapshot(&self) -> Vec<i16> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Rebuilds the logical sequence from the partitioned layout.
    ///
    /// Reads `size` cells from each range's `local_start`, then the trailing
    /// cell of the last range. Duplicated borders and padding are skipped.
    #[must_use]
    pub fn reconstruct(&self, ranges: &[Range]) -> Vec<i16> {
        let total: usize = ranges.iter().map(|r| r.size).sum::<usize>() + 1;
        let mut out = Vec::with_capacity(total);
        for range in ranges {
            out.extend(
                self.cells[range.local_start..range.trailing_index()]
                    .iter()
                    .map(|c| c.load(Ordering::Relaxed)),
            );
        }
        if let Some(last) = ranges.last() {
            out.push(self.load(last.trailing_index()));
        }
        out
    }
}

impl std::fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.cells.len())
            .field("padding", &self.padding)
            .finish()
    }
}

/// Lays out values and ranges into a [`SharedBuffer`].
#[derive(Clone, Copy, Debug)]
pub struct PaddedBufferBuilder {
    cache_line_bytes: usize,
}

impl PaddedBufferBuilder {
    /// Creates a builder for the given cache line size.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] if the line is narrower
    /// than one cell or wider than [`MAX_CACHE_LINE_BYTES`].
    pub fn new(cache_line_bytes: usize) -> SortResult<Self> {
        if cache_line_bytes < CELL_BYTES {
            return Err(SortError::InvalidConfiguration(format!(
                "cache line of {cache_line_bytes} bytes is narrower than a {CELL_BYTES}-byte cell"
            )));
        }
        if cache_line_bytes > MAX_CACHE_LINE_BYTES {
            return Err(SortError::InvalidConfiguration(format!(
                "cache line of {cache_line_bytes} bytes exceeds the {MAX_CACHE_LINE_BYTES}-byte limit"
            )));
        }
        Ok(Self { cache_line_bytes })
    }

    /// Padding cells appended after a non-final partition of `span` elements.
    ///
    /// The partition occupies `span + 1` cells; padding rounds it up to the
    /// next cache line, and is zero when it already ends on one.
    #[must_use]
    pub const fn padding_for(&self, span: usize) -> usize {
        let line = self.cache_line_bytes;
        let used = (CELL_BYTES * (span + 1)) % line;
        ((line - used) / CELL_BYTES) % (line / CELL_BYTES)
    }

    /// Builds the buffer and fills `local_start` / `size` of every range.
    ///
    /// `values` is the logical array; its length must equal the last range's
    /// `end + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] if the ranges are empty or
    /// do not cover `values` exactly.
    pub fn build(&self, values: &[i16], ranges: &mut [Range]) -> SortResult<SharedBuffer> {
        let Some(last) = ranges.last() else {
            return Err(SortError::InvalidConfiguration(
                "no ranges to lay out".to_string(),
            ));
        };
        if last.end + 1 != values.len() {
            return Err(SortError::InvalidConfiguration(format!(
                "ranges cover {} elements but {} values were given",
                last.end + 1,
                values.len()
            )));
        }

        let workers = ranges.len();
        let capacity = (workers - 1)
            .checked_mul(self.cache_line_bytes / CELL_BYTES)
            .and_then(|pad| pad.checked_add(values.len()))
            .and_then(|cells| cells.checked_add(2 * workers))
            .ok_or_else(|| {
                SortError::InvalidConfiguration(format!(
                    "padded layout of {} values over {workers} partitions overflows",
                    values.len()
                ))
            })?;
        let mut cells: Vec<i16> = Vec::with_capacity(capacity);
        let mut padding = 0usize;

        for (i, range) in ranges.iter_mut().enumerate() {
            let is_last = i == workers - 1;
            let span = range.span();
            range.local_start = cells.len();
            range.size = if is_last { span - 1 } else { span };

            // For i > 0 the first cell is the predecessor-border duplicate:
            // the predecessor's trailing cell holds the same logical element.
            cells.extend_from_slice(&values[range.start..=range.end]);

            if !is_last {
                cells.push(values[range.end + 1]);
                let pad = self.padding_for(span);
                cells.resize(cells.len() + pad, PADDING_SENTINEL);
                padding += pad;
            }
        }

        Ok(SharedBuffer {
            cells: cells.into_iter().map(AtomicI16::new).collect(),
            padding,
        })
    }
}
