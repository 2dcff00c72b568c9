//! Drift CLI: Batch loader for streaming NDJSON credit-transaction records.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use drift::{init_tracing, shutdown_signal, CliArgs, Config, RestWarehouse, StreamDriver};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();
    let config = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        batch_size = config.batch_size.get(),
        loader = ?config.loader,
        table = %config.table,
        "Starting drift batch loader"
    );

    let warehouse = match RestWarehouse::connect(&config.warehouse) {
        Ok(w) => Arc::new(w),
        Err(e) => {
            eprintln!("Failed to open warehouse connection: {e}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let driver = match StreamDriver::new(&config, warehouse, shutdown) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to initialize pipeline: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    match driver.run(stdin).await {
        Ok(stats) => {
            info!(
                records = stats.records,
                batches = stats.batches,
                "Ingest complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Pipeline failed: {e}");
            ExitCode::FAILURE
        }
    }
}
