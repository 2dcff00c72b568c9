//! drift-common: Shared components for the drift and flurry crates.
//!
//! This crate contains functionality used by both the ingest consumer (drift)
//! and the record generator (flurry):
//!
//! - `record` - The credit-transaction record model and NDJSON decoding
//! - `signal` - Signal handling for graceful shutdown
//! - `tracing` - Tracing initialization for CLI applications

pub mod record;
pub mod signal;
pub mod tracing;

// Re-export commonly used items
pub use record::{decode_record, Record, RecordError};
pub use self::tracing::init_tracing;
pub use signal::shutdown_signal;
