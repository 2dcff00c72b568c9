//! Stream driver for the ingestion pipeline.
//!
//! Reads newline-delimited records, feeds the accumulator, and hands full
//! batches to the loader, strictly in arrival order. The driver owns the
//! per-run scratch directory and the warehouse connection: both are
//! released exactly once on the way out, whatever happened in between.

use std::sync::Arc;

use snafu::prelude::*;
use tempfile::TempDir;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use drift_common::decode_record;

use crate::batch::BatchAccumulator;
use crate::config::Config;
use crate::error::{InputReadSnafu, PipelineError, RecordSnafu, ScratchSnafu};
use crate::load::{self, Loader};
use crate::warehouse::Warehouse;

/// Counters for one completed run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStats {
    /// Records accepted from the input stream.
    pub records: u64,
    /// Batches fully handed off to the warehouse.
    pub batches: u64,
}

/// Driver lifecycle.
///
/// `Running` reads and batches records until the sentinel, end of input, or
/// a shutdown signal; `Draining` loads the final, possibly undersized,
/// batch; `Done` ends the loop so resources can be released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Running,
    Draining,
    Done,
}

/// Reads the record stream and orchestrates batch loads.
pub struct StreamDriver {
    accumulator: BatchAccumulator,
    loader: Box<dyn Loader>,
    warehouse: Arc<dyn Warehouse>,
    scratch: TempDir,
    shutdown: CancellationToken,
}

impl StreamDriver {
    /// Build a driver for the run configuration.
    ///
    /// Creates the per-run scratch directory and selects the loader
    /// strategy.
    pub fn new(
        config: &Config,
        warehouse: Arc<dyn Warehouse>,
        shutdown: CancellationToken,
    ) -> Result<Self, PipelineError> {
        let scratch = TempDir::new().context(ScratchSnafu)?;
        let loader = load::for_kind(
            config.loader,
            warehouse.clone(),
            scratch.path(),
            &config.table,
        );

        Ok(Self {
            accumulator: BatchAccumulator::new(config.batch_size),
            loader,
            warehouse,
            scratch,
            shutdown,
        })
    }

    /// Build a driver from explicit parts.
    pub fn with_loader(
        accumulator: BatchAccumulator,
        loader: Box<dyn Loader>,
        warehouse: Arc<dyn Warehouse>,
        scratch: TempDir,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            accumulator,
            loader,
            warehouse,
            scratch,
            shutdown,
        }
    }

    /// Consume the input stream to completion.
    ///
    /// The warehouse connection is closed and the scratch directory removed
    /// on every exit path, success or failure.
    pub async fn run<R>(mut self, reader: R) -> Result<PipelineStats, PipelineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let result = self.drive(reader).await;

        self.warehouse.close().await;
        if let Err(e) = self.scratch.close() {
            warn!("Failed to remove scratch directory: {e}");
        }

        result
    }

    async fn drive<R>(&mut self, reader: R) -> Result<PipelineStats, PipelineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut state = DriverState::Running;
        let mut line_number: u64 = 0;
        let mut records: u64 = 0;

        loop {
            match state {
                DriverState::Running => {
                    let next = tokio::select! {
                        biased;

                        _ = self.shutdown.cancelled() => {
                            info!("Shutdown requested, draining buffered records");
                            state = DriverState::Draining;
                            continue;
                        }

                        line = lines.next_line() => line.context(InputReadSnafu)?,
                    };

                    match next {
                        // End of input without a sentinel: same graceful
                        // end-of-stream as the sentinel itself.
                        None => state = DriverState::Draining,
                        Some(line) if line.is_empty() => state = DriverState::Draining,
                        Some(line) => {
                            line_number += 1;
                            let record = decode_record(&line)
                                .context(RecordSnafu { line: line_number })?;
                            records += 1;

                            if self.accumulator.push(record) {
                                let batch = self.accumulator.drain();
                                self.loader.load_batch(batch).await?;
                            }
                        }
                    }
                }

                DriverState::Draining => {
                    if !self.accumulator.is_empty() {
                        let batch = self.accumulator.drain();
                        self.loader.load_batch(batch).await?;
                    }
                    state = DriverState::Done;
                }

                DriverState::Done => break,
            }
        }

        Ok(PipelineStats {
            records,
            batches: self.loader.batches_loaded(),
        })
    }
}
