//! Rewards Ledger Engine CLI
//!
//! Command-line interface for replaying rewards ledger operations from CSV
//! files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --strategy sync operations.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > accounts.csv
//! ```
//!
//! The program reads operation records from the input CSV file, applies them
//! to the ledger using the selected processing strategy, and writes the final
//! account table to stdout. Diagnostics go to stderr; set `RUST_LOG` to
//! control verbosity.
//!
//! # Processing Strategies
//!
//! - **sync**: Synchronous CSV parsing with single-threaded replay
//! - **async**: Asynchronous batch replay with per-account parallelism (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use rewards_ledger_engine::cli;
use rewards_ledger_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays valid CSV
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
