//! Settlement Engine CLI
//!
//! Command-line interface for the First Data settlement reconciliation core.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- parse-ack acknowledgment.txt
//! cargo run -- parse-extract extract.txt
//! cargo run -- build-pts deals.csv --date 2014-03-17 --sequence 3 > submission.pts
//! ```
//!
//! Structured logs go to stderr (filterable via `RUST_LOG`); command output
//! goes to stdout so a built PTS file can be redirected straight to disk.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Fatal error (missing file, I/O failure, unbuildable amounts)

use std::process;

use settlement_engine::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
