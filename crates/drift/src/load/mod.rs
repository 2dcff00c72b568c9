//! Stage-and-load orchestration.
//!
//! One [`Loader`] capability, two implementations selected at startup: a
//! synchronous bulk copy per batch, and an asynchronous ingest-pipe
//! notification. Both share the same first steps — encode the batch to a
//! uniquely-named Parquet file in the scratch directory, upload it to the
//! stage, and delete the local file — and differ only in how the load is
//! triggered.

mod copy;
mod pipe;

pub use copy::CopyLoader;
pub use pipe::PipeLoader;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use snafu::prelude::*;
use tracing::debug;
use uuid::Uuid;

use drift_common::Record;

use crate::encode::encode_batch;
use crate::error::{EncodeSnafu, LoadError, StageSnafu};
use crate::warehouse::Warehouse;

/// Loading strategy, selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LoaderKind {
    /// Synchronous bulk copy: stage the file, then issue a COPY statement
    /// that purges the staged file after a successful load.
    Copy,
    /// Asynchronous ingestion: stage the file, then notify the ingest pipe.
    /// The table becomes eventually consistent; the staged file's cleanup
    /// belongs to the pipe.
    Pipe,
}

/// Turns one drained batch into a staged file and a triggered load.
///
/// Called exactly once per full or final batch, strictly in arrival order;
/// batch N is fully handed off before batch N+1 is encoded.
#[async_trait]
pub trait Loader: Send {
    /// Encode, stage, and trigger the load of one batch.
    async fn load_batch(&mut self, records: Vec<Record>) -> Result<(), LoadError>;

    /// Number of batches fully handed off so far.
    fn batches_loaded(&self) -> u64;
}

/// Build the loader for the configured strategy.
pub fn for_kind(
    kind: LoaderKind,
    warehouse: Arc<dyn Warehouse>,
    scratch: &Path,
    table: &str,
) -> Box<dyn Loader> {
    match kind {
        LoaderKind::Copy => Box::new(CopyLoader::new(warehouse, scratch, table)),
        LoaderKind::Pipe => Box::new(PipeLoader::new(warehouse, scratch)),
    }
}

/// A batch file in the scratch directory, removed when the guard drops.
///
/// The guard covers every exit path: after a successful upload the drop
/// happens immediately on return, and on encode or upload failure it runs
/// during unwinding of the error.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        // Best effort; the scratch directory itself is removed recursively
        // at shutdown.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Shared steps for both strategies: encode the batch to a fresh uniquely
/// named file, upload it, and remove the local copy.
///
/// Returns the staged object name. File names embed a fresh UUID so a
/// retried run can never collide with a previous attempt's staged object.
async fn stage_batch(
    warehouse: &dyn Warehouse,
    scratch: &Path,
    batch: u64,
    records: &[Record],
) -> Result<String, LoadError> {
    let file_name = format!("{}.parquet", Uuid::now_v7());
    let local = ScratchFile::new(scratch.join(&file_name));

    let encoded = encode_batch(records, local.path()).context(EncodeSnafu { batch })?;
    debug!(
        batch,
        records = encoded.records,
        bytes = encoded.bytes,
        file = %file_name,
        "Encoded batch"
    );

    let staged = warehouse
        .stage_file(local.path(), &file_name)
        .await
        .context(StageSnafu {
            batch,
            file: file_name.clone(),
        })?;

    // `local` drops here: the scratch file is gone before the load trigger,
    // and equally gone when encode or upload failed above.
    Ok(staged)
}
