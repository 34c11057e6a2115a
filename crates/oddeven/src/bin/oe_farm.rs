//! # Farm Sort Driver
//!
//! Sorts a random array with the channel-driven master/worker farm.

use oddeven::{check_sorted, parse_sort_args, print_outcome, Variant, EXIT_FAILURE, EXIT_USAGE};
use oddeven_core::{FarmSorter, SortError};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("oe_farm", String::as_str);

    let config = match parse_sort_args(Variant::Farm, args.get(1..).unwrap_or_default()) {
        Ok(config) => config,
        Err(SortError::InvalidUsage(reason)) => {
            println!("{}", Variant::Farm.usage(program));
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
    println!("║         ODDEVEN PARALLEL SORT (MASTER/WORKER FARM) ║");
    println!("╚════════════════════════════════════════════════════╝");
    println!(
        "seed={} len={} nw={} cache_line={} max={}",
        config.seed,
        config.length,
        config.workers,
        config.cache_line_bytes,
        config.max_value
    );
    println!();

    let outcome = match FarmSorter::new(config).and_then(|c| c.run()) {
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
