//! # Split-Vector Sequential Driver
//!
//! Single-thread baseline over separate even/odd vectors.

use oddeven::{check_sorted, parse_seq_args, print_timings, seq_usage, EXIT_FAILURE, EXIT_USAGE};
use oddeven_core::{random_values, sequential, SortError};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("oe_double", String::as_str);

    let parsed = match parse_seq_args(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(SortError::InvalidUsage(reason)) => {
            println!("{}", seq_usage(program));
            println!("Error: {reason}");
            std::process::exit(EXIT_USAGE);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let mut values = match random_values(parsed.seed, parsed.length, parsed.max_value) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    println!("╔════════════════════════════════════════════════════╗");
    println!("║         ODDEVEN SEQUENTIAL SORT (SPLIT VECTORS)    ║");
    println!("╚════════════════════════════════════════════════════╝");
    println!(
        "seed={} len={} max={}",
        parsed.seed, parsed.length, parsed.max_value
    );
    println!();

    #[cfg(feature = "debug-dump")]
    oddeven::print_cells("Before", &values);

    let timings = sequential::sort_split(&mut values);

    #[cfg(feature = "debug-dump")]
    oddeven::print_cells("After", &values);

    print_timings(&timings);
    std::process::exit(check_sorted(&values));
}
