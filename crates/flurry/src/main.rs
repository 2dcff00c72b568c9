//! Flurry CLI: Synthetic credit-transaction record generator.
//!
//! Emits newline-delimited JSON records to stdout, one per line, followed
//! by the end-of-stream sentinel (a single blank line). Pipe the output
//! into drift:
//!
//! ```text
//! flurry 100000 | drift 10000 --loader copy
//! ```

mod generate;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use drift_common::init_tracing;
use generate::RecordGenerator;

#[derive(Debug, Parser)]
#[command(name = "flurry", about = "Synthetic credit-transaction record generator")]
struct CliArgs {
    /// Number of records to emit.
    count: u64,

    /// Seed for deterministic output.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();
    let mut generator = RecordGenerator::new(args.seed);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for _ in 0..args.count {
        let record = match generator.next_record() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Failed to generate record: {e}");
                return ExitCode::FAILURE;
            }
        };

        let line = match serde_json::to_string(&record) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to serialize record: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Err(e) = writeln!(out, "{line}") {
            eprintln!("Failed to write record: {e}");
            return ExitCode::FAILURE;
        }
    }

    // End-of-stream sentinel.
    if let Err(e) = writeln!(out).and_then(|_| out.flush()) {
        eprintln!("Failed to write sentinel: {e}");
        return ExitCode::FAILURE;
    }

    info!(records = args.count, "Generation complete");
    ExitCode::SUCCESS
}
