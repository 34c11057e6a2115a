//! # Barrier Sort Driver
//!
//! Sorts a random array with the barrier-synchronized worker pool.

use oddeven::{check_sorted, parse_sort_args, print_outcome, Variant, EXIT_FAILURE, EXIT_USAGE};
use oddeven_core::{Coordinator, SortError};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("oe_sort", String::as_str);

    let config = match parse_sort_args(Variant::Barrier, args.get(1..).unwrap_or_default()) {
        Ok(config) => config,
        Err(SortError::InvalidUsage(reason)) => {
            println!("{}", Variant::Barrier.usage(program));
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
    println!("║         ODDEVEN PARALLEL SORT (BARRIER POOL)       ║");
    println!("╚════════════════════════════════════════════════════╝");
    println!(
        "seed={} len={} nw={} cache_line={} max={} wait={:?}",
        config.seed,
        config.length,
        config.workers,
        config.cache_line_bytes,
        config.max_value,
        config.wait_strategy
    );
    println!();

    let outcome = match Coordinator::new(config).and_then(|c| c.run()) {
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
