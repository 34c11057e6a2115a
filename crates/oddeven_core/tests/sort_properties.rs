//! Integration tests for the parallel sort variants.

use oddeven_core::{
    assign_ranges, random_values, sequential, Coordinator, FarmSorter, ParallelForSorter,
    SortConfig, SortError, WaitStrategy,
};
use proptest::prelude::*;

fn config(seed: u64, length: usize, workers: usize) -> SortConfig {
    SortConfig::new(seed, length, workers, 64).with_pinning(false)
}

fn sorted_copy(values: &[i16]) -> Vec<i16> {
    let mut expected = values.to_vec();
    expected.sort_unstable();
    expected
}

#[test]
fn test_scenario_small_two_workers() {
    let cfg = config(1, 8, 2).with_max_value(100);
    let outcome = Coordinator::new(cfg).unwrap().run().unwrap();
    let input = random_values(1, 8, 100).unwrap();

    assert_eq!(outcome.sorted.len(), 8);
    assert!(outcome.sorted.iter().all(|v| (0..100).contains(v)));
    assert_eq!(outcome.sorted, sorted_copy(&input));
}

#[test]
fn test_worker_count_does_not_change_output() {
    let single = Coordinator::new(config(42, 1000, 1).with_max_value(500))
        .unwrap()
        .run()
        .unwrap();
    let eight = Coordinator::new(config(42, 1000, 8).with_max_value(500))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(single.sorted, eight.sorted);
    assert_eq!(single.sorted.len(), 1000);
    assert!(eight.is_sorted());
}

#[test]
fn test_initial_array_is_deterministic() {
    let a = random_values(9, 256, 1000).unwrap();
    let b = random_values(9, 256, 1000).unwrap();
    let c = random_values(10, 256, 1000).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_sorted_input_converges_in_one_round() {
    let values: Vec<i16> = (0..500).collect();
    for workers in [1, 3, 8] {
        let outcome = Coordinator::new(config(0, values.len(), workers))
            .unwrap()
            .sort_values(&values)
            .unwrap();
        assert_eq!(outcome.metrics.rounds, 1, "workers = {workers}");
        assert_eq!(outcome.sorted, values);
    }
}

#[test]
fn test_even_phase_only_swaps_terminate_after_one_round() {
    // Every inversion sits on an even pair, so the odd phase never swaps.
    let values: Vec<i16> = (0..200).map(|i| i ^ 1).collect();
    let outcome = Coordinator::new(config(0, values.len(), 4))
        .unwrap()
        .sort_values(&values)
        .unwrap();

    assert_eq!(outcome.metrics.rounds, 1);
    assert_eq!(outcome.sorted, (0..200).collect::<Vec<i16>>());
    assert!(outcome.metrics.reports.iter().all(|r| r.active_rounds == 0));
}

#[test]
fn test_padding_does_not_change_result() {
    let values = random_values(3, 777, 2000).unwrap();
    let expected = sorted_copy(&values);

    for line in [2, 4, 8, 16, 32, 64, 128, 256] {
        let cfg = SortConfig::new(3, values.len(), 5, line).with_pinning(false);
        let outcome = Coordinator::new(cfg).unwrap().sort_values(&values).unwrap();
        assert_eq!(outcome.sorted, expected, "cache line {line}");
    }
}

#[test]
fn test_shortest_arrays() {
    for values in [vec![5, 1], vec![3, 1, 2], vec![1, 1, 0]] {
        let outcome = Coordinator::new(config(0, values.len(), 1))
            .unwrap()
            .sort_values(&values)
            .unwrap();
        assert_eq!(outcome.sorted, sorted_copy(&values));
    }
}

#[test]
fn test_all_variants_agree() {
    let cfg = config(77, 640, 6).with_max_value(300);
    let values = random_values(cfg.seed, cfg.length, cfg.max_value).unwrap();

    let spin = Coordinator::new(cfg.clone()).unwrap().run().unwrap();
    let blocking = Coordinator::new(cfg.clone().with_wait_strategy(WaitStrategy::Blocking))
        .unwrap()
        .run()
        .unwrap();
    let farm = FarmSorter::new(cfg.clone()).unwrap().run().unwrap();
    let parallel_for = ParallelForSorter::new(cfg.with_grain(8)).unwrap().run().unwrap();
    let mut seq = values.clone();
    let timings = sequential::sort(&mut seq);
    let mut split = values.clone();
    let split_timings = sequential::sort_split(&mut split);

    assert_eq!(spin.sorted, seq);
    assert_eq!(blocking.sorted, seq);
    assert_eq!(farm.sorted, seq);
    assert_eq!(parallel_for.sorted, seq);
    assert_eq!(split, seq);
    assert_eq!(spin.metrics.rounds, timings.rounds);
    assert_eq!(farm.metrics.rounds, timings.rounds);
    assert_eq!(parallel_for.metrics.rounds, timings.rounds);
    assert_eq!(split_timings.rounds, timings.rounds);
}

#[test]
fn test_round_ceiling_reports_violation() {
    let values: Vec<i16> = (0..300).rev().collect();
    let cfg = config(0, values.len(), 4).with_max_rounds(5);
    assert_eq!(
        Coordinator::new(cfg).unwrap().sort_values(&values),
        Err(SortError::AlgorithmInvariantViolation { rounds: 5, ceiling: 5 })
    );
}

#[test]
fn test_incompatible_layout_is_rejected() {
    let result = Coordinator::new(config(1, 24, 8)).unwrap().run();
    assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));

    let result = FarmSorter::new(config(1, 24, 8)).unwrap().run();
    assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_output_is_sorted_permutation(
        values in prop::collection::vec(any::<i16>(), 2..400),
        workers in 1usize..=6,
    ) {
        prop_assume!(assign_ranges(values.len(), workers).is_ok());

        let outcome = Coordinator::new(config(0, values.len(), workers))
            .unwrap()
            .sort_values(&values)
            .unwrap();
        prop_assert_eq!(outcome.sorted, sorted_copy(&values));
    }

    #[test]
    fn prop_farm_matches_sequential(
        values in prop::collection::vec(0i16..100, 2..200),
        workers in 1usize..=4,
    ) {
        prop_assume!(assign_ranges(values.len(), workers).is_ok());

        let farm = FarmSorter::new(config(0, values.len(), workers))
            .unwrap()
            .sort_values(&values)
            .unwrap();
        let mut seq = values.clone();
        let timings = sequential::sort(&mut seq);
        prop_assert_eq!(farm.sorted, seq);
        prop_assert_eq!(farm.metrics.rounds, timings.rounds);
    }

    #[test]
    fn prop_parallel_for_and_split_match_sequential(
        values in prop::collection::vec(any::<i16>(), 2..300),
        workers in 1usize..=4,
        grain in 1usize..=64,
    ) {
        let cfg = config(0, values.len(), workers).with_grain(grain);
        let parallel_for = ParallelForSorter::new(cfg).unwrap().sort_values(&values).unwrap();
        let mut seq = values.clone();
        let timings = sequential::sort(&mut seq);
        let mut split = values.clone();
        let split_timings = sequential::sort_split(&mut split);

        prop_assert_eq!(&parallel_for.sorted, &seq);
        prop_assert_eq!(parallel_for.metrics.rounds, timings.rounds);
        prop_assert_eq!(&split, &seq);
        prop_assert_eq!(split_timings.rounds, timings.rounds);
    }
}
