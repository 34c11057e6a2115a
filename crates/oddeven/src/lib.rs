//! # ODDEVEN Command Line
//!
//! Argument parsing and console reporting shared by the `oe_sort`,
//! `oe_farm`, `oe_for`, `oe_seq` and `oe_double` binaries.
//!
//! ```text
//! oe_sort seed length worker_count cache_line_bytes [max_value] [--blocking] [--no-pin]
//! oe_sort --config run.toml [--blocking] [--no-pin]
//! oe_farm seed length worker_count cache_line_bytes [max_value] [--no-pin]
//! oe_for  seed length worker_count grain [max_value] [--no-pin]
//! oe_seq  seed length [max_value]
//! oe_double seed length [max_value]
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use std::str::FromStr;

use oddeven_core::buffer::DEFAULT_CACHE_LINE_BYTES;
use oddeven_core::{PhaseTimings, SortConfig, SortError, SortOutcome, SortResult, WaitStrategy};

/// Exit code for missing or malformed arguments.
pub const EXIT_USAGE: i32 = -1;
/// Exit code for configuration or runtime failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the final sortedness check fails.
pub const EXIT_UNSORTED: i32 = 2;

/// Which parallel driver the arguments are for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Barrier-driven pool (`oe_sort`).
    Barrier,
    /// Channel master/worker (`oe_farm`).
    Farm,
    /// Rayon parallel-for (`oe_for`). The fourth positional is the grain.
    ParallelFor,
}

impl Variant {
    /// Usage text for `program`.
    #[must_use]
    pub fn usage(self, program: &str) -> String {
        match self {
            Self::Barrier => format!(
                "Usage: {program} seed len nw cache_line [max-value] [--blocking] [--no-pin]\n       \
                 {program} --config <file.toml> [--blocking] [--no-pin]"
            ),
            Self::Farm => format!(
                "Usage: {program} seed len nw cache_line [max-value] [--no-pin]\n       \
                 {program} --config <file.toml> [--no-pin]"
            ),
            Self::ParallelFor => format!(
                "Usage: {program} seed len nw grain [max-value] [--no-pin]\n       \
                 {program} --config <file.toml> [--no-pin]"
            ),
        }
    }
}

/// Usage text for the sequential driver.
#[must_use]
pub fn seq_usage(program: &str) -> String {
    format!("Usage: {program} seed len [max-value]")
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> SortResult<T> {
    raw.parse()
        .map_err(|_| SortError::InvalidUsage(format!("{name} must be a number, got '{raw}'")))
}

/// Parses the arguments of a parallel driver (without the program name).
///
/// # Errors
///
/// - [`SortError::InvalidUsage`] for missing, unknown or unparseable arguments
/// - [`SortError::InvalidConfiguration`] if `--config` names an unreadable or
///   invalid file
pub fn parse_sort_args(variant: Variant, args: &[String]) -> SortResult<SortConfig> {
    let mut positional = Vec::new();
    let mut config_path = None;
    let mut blocking = false;
    let mut pin = true;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--blocking" if variant == Variant::Barrier => blocking = true,
            "--no-pin" => pin = false,
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| SortError::InvalidUsage("--config needs a file".to_string()))?;
                config_path = Some(path);
            }
            flag if flag.starts_with("--") => {
                return Err(SortError::InvalidUsage(format!("unknown option '{flag}'")));
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let config = match config_path {
        Some(path) => {
            if !positional.is_empty() {
                return Err(SortError::InvalidUsage(
                    "--config replaces the positional arguments".to_string(),
                ));
            }
            load_config(path)?
        }
        None => {
            let [seed, length, workers, fourth, rest @ ..] = positional.as_slice() else {
                return Err(SortError::InvalidUsage(format!(
                    "expected at least 4 arguments, got {}",
                    positional.len()
                )));
            };
            let seed = parse_field("seed", seed)?;
            let length = parse_field("len", length)?;
            let workers = parse_field("nw", workers)?;
            let mut config = if variant == Variant::ParallelFor {
                SortConfig::new(seed, length, workers, DEFAULT_CACHE_LINE_BYTES)
                    .with_grain(parse_field("grain", fourth)?)
            } else {
                SortConfig::new(seed, length, workers, parse_field("cache_line", fourth)?)
            };
            match rest {
                [] => {}
                [max] => config = config.with_max_value(parse_field("max-value", max)?),
                _ => {
                    return Err(SortError::InvalidUsage(format!(
                        "expected at most 5 arguments, got {}",
                        positional.len()
                    )))
                }
            }
            config
        }
    };

    let pin = config.pin_threads && pin;
    let mut config = config.with_pinning(pin);
    if blocking {
        config = config.with_wait_strategy(WaitStrategy::Blocking);
    }
    config.validate()?;
    Ok(config)
}

/// Reads and validates a TOML config file.
///
/// # Errors
///
/// Returns [`SortError::InvalidConfiguration`] if the file cannot be read or
/// parsed.
pub fn load_config(path: &str) -> SortResult<SortConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SortError::InvalidConfiguration(format!("cannot read {path}: {e}")))?;
    SortConfig::from_toml_str(&text)
}

/// Arguments of the sequential driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeqArgs {
    /// Random seed.
    pub seed: u64,
    /// Number of elements.
    pub length: usize,
    /// Exclusive upper bound of generated values.
    pub max_value: i16,
}

/// Parses the sequential driver's arguments (without the program name).
///
/// # Errors
///
/// Returns [`SortError::InvalidUsage`] for missing, extra or unparseable
/// arguments.
pub fn parse_seq_args(args: &[String]) -> SortResult<SeqArgs> {
    match args {
        [seed, length, rest @ ..] if rest.len() <= 1 => Ok(SeqArgs {
            seed: parse_field("seed", seed)?,
            length: parse_field("len", length)?,
            max_value: rest
                .first()
                .map_or(Ok(i16::MAX), |max| parse_field("max-value", max))?,
        }),
        _ => Err(SortError::InvalidUsage(format!(
            "expected 2 or 3 arguments, got {}",
            args.len()
        ))),
    }
}

/// Prints the run summary of a parallel driver.
pub fn print_outcome(outcome: &SortOutcome) {
    let m = &outcome.metrics;
    println!("┌─ RUN ──────────────────────────────────────────────┐");
    println!("│ Elements:          {}", outcome.sorted.len());
    println!("│ Workers:           {} ({} pinned)", m.workers, m.pinned_workers);
    println!("│ Buffer cells:      {} ({} padding)", m.buffer_cells, m.padding_cells);
    println!("│ Rounds:            {}", m.rounds);
    println!("└────────────────────────────────────────────────────┘");
    println!("Simulation spent: {} usecs", m.elapsed_micros());
}

/// Prints the phase breakdown of a sequential run.
pub fn print_timings(timings: &PhaseTimings) {
    println!("Simulation spent: {} usecs", timings.total.as_micros());
    println!(
        "Average even phase: {} usecs over {} phases ({:.3} usecs per phase)",
        timings.even_time.as_micros(),
        timings.rounds,
        timings.mean_even().as_secs_f64() * 1e6
    );
    println!(
        "Average odd phase:  {} usecs over {} phases ({:.3} usecs per phase)",
        timings.odd_time.as_micros(),
        timings.rounds,
        timings.mean_odd().as_secs_f64() * 1e6
    );
    println!(
        "Overhead: {} usecs ({:.3} usecs per phase)",
        timings.overhead().as_micros(),
        timings.overhead_per_phase().as_secs_f64() * 1e6
    );
}

/// Prints a labelled space-separated list of cells.
pub fn print_cells(label: &str, cells: &[i16]) {
    let line: Vec<String> = cells.iter().map(ToString::to_string).collect();
    println!("{label}: {}", line.join(" "));
}

/// Prints the raw buffers captured before and after a run.
pub fn print_buffers(outcome: &SortOutcome) {
    if let Some(before) = &outcome.buffer_before {
        print_cells("Buffer before", before);
    }
    if let Some(after) = &outcome.buffer_after {
        print_cells("Buffer after", after);
    }
    print_cells("Sorted", &outcome.sorted);
}

/// Reports the final check and returns the exit code.
#[must_use]
pub fn check_sorted(sorted: &[i16]) -> i32 {
    if sorted.windows(2).all(|w| w[0] <= w[1]) {
        println!("✓ Sequence is sorted");
        0
    } else {
        eprintln!("✗ Sequence is NOT sorted");
        EXIT_UNSORTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_positional() {
        let config = parse_sort_args(Variant::Barrier, &args(&["1", "8", "2", "64", "100"])).unwrap();
        assert_eq!(config.seed, 1);
        assert_eq!(config.length, 8);
        assert_eq!(config.workers, 2);
        assert_eq!(config.cache_line_bytes, 64);
        assert_eq!(config.max_value, 100);
        assert_eq!(config.wait_strategy, WaitStrategy::Spin);
        assert!(config.pin_threads);
    }

    #[test]
    fn test_parse_flags() {
        let config = parse_sort_args(
            Variant::Barrier,
            &args(&["--no-pin", "1", "8", "2", "64", "--blocking"]),
        )
        .unwrap();
        assert_eq!(config.wait_strategy, WaitStrategy::Blocking);
        assert!(!config.pin_threads);
        assert_eq!(config.max_value, i16::MAX);
    }

    #[test]
    fn test_farm_rejects_blocking() {
        assert!(matches!(
            parse_sort_args(Variant::Farm, &args(&["1", "8", "2", "64", "--blocking"])),
            Err(SortError::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_parallel_for_reads_grain() {
        let config =
            parse_sort_args(Variant::ParallelFor, &args(&["1", "800", "4", "32", "50"])).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.grain, 32);
        assert_eq!(config.cache_line_bytes, DEFAULT_CACHE_LINE_BYTES);
        assert_eq!(config.max_value, 50);

        assert!(matches!(
            parse_sort_args(Variant::ParallelFor, &args(&["1", "800", "4", "0"])),
            Err(SortError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            parse_sort_args(Variant::ParallelFor, &args(&["1", "800", "4", "32", "--blocking"])),
            Err(SortError::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_missing_arguments_are_usage_errors() {
        assert!(matches!(
            parse_sort_args(Variant::Barrier, &args(&["1", "8", "2"])),
            Err(SortError::InvalidUsage(_))
        ));
        assert!(matches!(
            parse_sort_args(Variant::Barrier, &args(&["--config"])),
            Err(SortError::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_garbage_numbers_are_usage_errors() {
        assert!(matches!(
            parse_sort_args(Variant::Barrier, &args(&["x", "8", "2", "64"])),
            Err(SortError::InvalidUsage(_))
        ));
        assert!(matches!(
            parse_sort_args(Variant::Barrier, &args(&["1", "8", "2", "64", "99999"])),
            Err(SortError::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            parse_sort_args(Variant::Barrier, &args(&["1", "8", "0", "64"])),
            Err(SortError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_file() {
        let path = std::env::temp_dir().join(format!("oddeven_cli_{}.toml", std::process::id()));
        std::fs::write(&path, "seed = 3\nlength = 64\nworkers = 2\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config =
            parse_sort_args(Variant::Barrier, &args(&["--config", &path_str, "--no-pin"])).unwrap();
        assert_eq!(config.seed, 3);
        assert_eq!(config.length, 64);
        assert!(!config.pin_threads);

        assert!(matches!(
            parse_sort_args(Variant::Barrier, &args(&["--config", &path_str, "1"])),
            Err(SortError::InvalidUsage(_))
        ));
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            load_config("/nonexistent/oddeven.toml"),
            Err(SortError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_parse_seq_args() {
        assert_eq!(
            parse_seq_args(&args(&["5", "100"])).unwrap(),
            SeqArgs {
                seed: 5,
                length: 100,
                max_value: i16::MAX
            }
        );
        assert_eq!(parse_seq_args(&args(&["5", "100", "7"])).unwrap().max_value, 7);
        assert!(parse_seq_args(&args(&["5"])).is_err());
        assert!(parse_seq_args(&args(&["5", "100", "7", "8"])).is_err());
        assert!(parse_seq_args(&args(&["5", "ten"])).is_err());
    }

    #[test]
    fn test_check_sorted() {
        assert_eq!(check_sorted(&[1, 2, 2]), 0);
        assert_eq!(check_sorted(&[2, 1]), EXIT_UNSORTED);
    }
}
