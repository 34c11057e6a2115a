//! # Sequential Baseline
//!
//! Single-thread odd-even transposition sort over the same kernel the
//! parallel variants use, with per-phase timing. [`sort_split`] runs the
//! same phases over separate even/odd vectors.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::kernel::{compare_exchange, even_pass, odd_pass};

/// Time spent in each phase of a sequential run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Rounds executed. Each round runs one even and one odd phase.
    pub rounds: u64,
    /// Total time in even phases.
    pub even_time: Duration,
    /// Total time in odd phases.
    pub odd_time: Duration,
    /// Wall-clock time of the whole loop.
    pub total: Duration,
}

impl PhaseTimings {
    /// Loop time not spent inside either phase.
    #[must_use]
    pub fn overhead(&self) -> Duration {
        self.total.saturating_sub(self.even_time + self.odd_time)
    }

    /// Mean even phase duration, or zero if no round ran.
    #[must_use]
    pub fn mean_even(&self) -> Duration {
        self.per_round(self.even_time)
    }

    /// Mean odd phase duration, or zero if no round ran.
    #[must_use]
    pub fn mean_odd(&self) -> Duration {
        self.per_round(self.odd_time)
    }

    /// Overhead per phase.
    #[must_use]
    pub fn overhead_per_phase(&self) -> Duration {
        self.per_round(self.overhead()) / 2
    }

    fn per_round(&self, total: Duration) -> Duration {
        match u32::try_from(self.rounds) {
            Ok(0) => Duration::ZERO,
            Ok(rounds) => total / rounds,
            Err(_) => Duration::from_secs_f64(total.as_secs_f64() / self.rounds as f64),
        }
    }
}

/// Sorts `values` in place and reports where the time went.
///
/// Slices shorter than two elements are already sorted and report one
/// quiet round.
pub fn sort(values: &mut [i16]) -> PhaseTimings {
    let timings = run_phases(values, even_pass, odd_pass);
    debug!(
        length = values.len(),
        rounds = timings.rounds,
        overhead = ?timings.overhead(),
        "sequential sort converged"
    );
    timings
}

/// Even- and odd-indexed elements held in two separate vectors.
///
/// Logical element `2i` is `even[i]` and `2i + 1` is `odd[i]`, so both
/// phases walk the vectors with stride one:
///
/// ```text
/// even phase:  even[i] <-> odd[i]
/// odd phase:   odd[i]  <-> even[i + 1]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitVectors {
    even: Vec<i16>,
    odd: Vec<i16>,
}

impl SplitVectors {
    /// Splits `values` by index parity.
    #[must_use]
    pub fn split(values: &[i16]) -> Self {
        let mut split = Self {
            even: Vec::with_capacity(values.len().div_ceil(2)),
            odd: Vec::with_capacity(values.len() / 2),
        };
        for pair in values.chunks(2) {
            split.even.push(pair[0]);
            split.odd.extend(pair.get(1));
        }
        split
    }

    /// Interleaves the vectors back into `out`, which must have the
    /// length of the split slice.
    pub fn merge_into(&self, out: &mut [i16]) {
        for (i, slot) in out.iter_mut().enumerate() {
            let half = if i % 2 == 0 { &self.even } else { &self.odd };
            *slot = half[i / 2];
        }
    }

    fn even_phase(&mut self) {
        for (lo, hi) in self.even.iter_mut().zip(self.odd.iter_mut()) {
            compare_exchange(lo, hi);
        }
    }

    fn odd_phase(&mut self) -> bool {
        let Some(next) = self.even.get_mut(1..) else {
            return false;
        };
        let mut swapped = false;
        for (lo, hi) in self.odd.iter_mut().zip(next.iter_mut()) {
            swapped |= compare_exchange(lo, hi);
        }
        swapped
    }
}

/// Same algorithm as [`sort`], run over [`SplitVectors`]. The split and
/// merge are outside the timed loop.
pub fn sort_split(values: &mut [i16]) -> PhaseTimings {
    let mut split = SplitVectors::split(values);
    let timings = run_phases(&mut split, SplitVectors::even_phase, SplitVectors::odd_phase);
    split.merge_into(values);
    debug!(
        length = values.len(),
        rounds = timings.rounds,
        overhead = ?timings.overhead(),
        "split-vector sort converged"
    );
    timings
}

fn run_phases<T: ?Sized>(
    state: &mut T,
    even: impl Fn(&mut T),
    odd: impl Fn(&mut T) -> bool,
) -> PhaseTimings {
    let mut timings = PhaseTimings::default();
    let start = Instant::now();

    loop {
        timings.rounds += 1;

        let phase = Instant::now();
        even(state);
        timings.even_time += phase.elapsed();

        let phase = Instant::now();
        let swapped = odd(state);
        timings.odd_time += phase.elapsed();

        if !swapped {
            break;
        }
    }

    timings.total = start.elapsed();
    timings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_reversed_input() {
        let mut values: Vec<i16> = (0..101).rev().collect();
        let timings = sort(&mut values);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(timings.rounds <= 52);
    }

    #[test]
    fn test_sorted_input_takes_one_round() {
        let mut values = [1, 2, 3, 4, 5];
        assert_eq!(sort(&mut values).rounds, 1);
    }

    #[test]
    fn test_tiny_slices() {
        let mut empty: [i16; 0] = [];
        assert_eq!(sort(&mut empty).rounds, 1);

        let mut pair = [9, -3];
        sort(&mut pair);
        assert_eq!(pair, [-3, 9]);
    }

    #[test]
    fn test_split_vectors_round_trip() {
        let cases: [Vec<i16>; 4] = [vec![], vec![1], vec![1, 2], vec![5, 4, 3, 2, 1]];
        for values in cases {
            let split = SplitVectors::split(&values);
            let mut out = vec![0; values.len()];
            split.merge_into(&mut out);
            assert_eq!(out, values);
        }
    }

    #[test]
    fn test_split_sort_matches_interleaved() {
        for len in [2usize, 3, 10, 101, 256] {
            let values: Vec<i16> = (0..len).map(|i| ((i * 7919) % 113) as i16).collect();
            let mut plain = values.clone();
            let mut split = values.clone();
            let plain_timings = sort(&mut plain);
            let split_timings = sort_split(&mut split);
            assert_eq!(plain, split, "len {len}");
            assert_eq!(plain_timings.rounds, split_timings.rounds, "len {len}");
        }
    }

    #[test]
    fn test_split_sort_tiny_slices() {
        let mut one = [3];
        assert_eq!(sort_split(&mut one).rounds, 1);
        let mut pair = [2, 1];
        sort_split(&mut pair);
        assert_eq!(pair, [1, 2]);
    }

    #[test]
    fn test_overhead_never_negative() {
        let timings = PhaseTimings {
            rounds: 2,
            even_time: Duration::from_micros(10),
            odd_time: Duration::from_micros(10),
            total: Duration::from_micros(15),
        };
        assert_eq!(timings.overhead(), Duration::ZERO);
    }

    #[test]
    fn test_means() {
        let timings = PhaseTimings {
            rounds: 4,
            even_time: Duration::from_micros(40),
            odd_time: Duration::from_micros(80),
            total: Duration::from_micros(200),
        };
        assert_eq!(timings.mean_even(), Duration::from_micros(10));
        assert_eq!(timings.mean_odd(), Duration::from_micros(20));
        assert_eq!(timings.overhead_per_phase(), Duration::from_micros(10));
        assert_eq!(PhaseTimings::default().mean_even(), Duration::ZERO);
    }
}
