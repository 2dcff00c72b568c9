//! Drift: Batch loader for streaming NDJSON credit-transaction records.
//!
//! This crate handles:
//! - Reading newline-delimited JSON records from stdin until the
//!   end-of-stream sentinel (a blank line) or end of input
//! - Accumulating records into fixed-size batches
//! - Encoding each batch to a Snappy-compressed Parquet file in a per-run
//!   scratch directory
//! - Staging the file to the warehouse stage area and triggering a bulk
//!   load, either synchronously (`COPY INTO`) or asynchronously (ingest
//!   pipe notification)

pub mod batch;
pub mod config;
pub mod encode;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod warehouse;

// Re-export commonly used items
pub use config::{CliArgs, Config};
pub use error::PipelineError;
pub use load::{Loader, LoaderKind};
pub use pipeline::{PipelineStats, StreamDriver};
pub use warehouse::{RestWarehouse, Warehouse};

// Re-export from drift-common
pub use drift_common::{decode_record, init_tracing, shutdown_signal, Record};
