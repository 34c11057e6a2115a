//! # Parallel-For Sort Driver
//!
//! Sorts a random array with one rayon loop per phase.

use oddeven::{check_sorted, parse_sort_args, print_outcome, Variant, EXIT_FAILURE, EXIT_USAGE};
use oddeven_core::{ParallelForSorter, SortError};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("oe_for", String::as_str);

    let config = match parse_sort_args(Variant::ParallelFor, args.get(1..).unwrap_or_default()) {
        Ok(config) => config,
        Err(SortError::InvalidUsage(reason)) => {
            println!("{}", Variant::ParallelFor.usage(program));
            println!("Error: {reason}");
            std::process::exit(EXIT_USAGE);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    #[cfg(feature = "debug-dump")]
    let config = config.with_capture_buffers(true);

    println!("╔════════════════════════════════════════════════════╗");
    println!("║         ODDEVEN PARALLEL SORT (PARALLEL FOR)       ║");
    println!("╚════════════════════════════════════════════════════╝");
    println!(
        "seed={} len={} nw={} grain={} max={}",
        config.seed,
        config.length,
        config.workers,
        config.grain,
        config.max_value
    );
    println!();

    let outcome = match ParallelForSorter::new(config).and_then(|c| c.run()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    #[cfg(feature = "debug-dump")]
    oddeven::print_buffers(&outcome);

    print_outcome(&outcome);
    std::process::exit(check_sorted(&outcome.sorted));
}
