//! Asynchronous ingest-pipe loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use snafu::prelude::*;
use tracing::info;

use drift_common::Record;

use crate::error::{LoadError, NotifySnafu};
use crate::warehouse::Warehouse;

use super::{stage_batch, Loader};

/// Stages each batch and notifies the ingest pipe.
///
/// Exactly one notification per batch. The destination table becomes
/// eventually consistent once the pipe processes the notification; this
/// loader neither waits for the load nor deletes the staged object, whose
/// lifecycle belongs to the pipe.
pub struct PipeLoader {
    warehouse: Arc<dyn Warehouse>,
    scratch: PathBuf,
    batches: u64,
}

impl PipeLoader {
    /// Create a loader writing scratch files under `scratch`.
    pub fn new(warehouse: Arc<dyn Warehouse>, scratch: &Path) -> Self {
        Self {
            warehouse,
            scratch: scratch.to_path_buf(),
            batches: 0,
        }
    }
}

#[async_trait]
impl Loader for PipeLoader {
    async fn load_batch(&mut self, records: Vec<Record>) -> Result<(), LoadError> {
        let batch = self.batches + 1;
        info!(batch, records = records.len(), "Preparing batch for ingest");

        let staged = stage_batch(self.warehouse.as_ref(), &self.scratch, batch, &records).await?;

        let response = self
            .warehouse
            .notify_ingest(&staged)
            .await
            .context(NotifySnafu {
                batch,
                file: staged.clone(),
            })?;

        self.batches = batch;
        info!(batch, file = %staged, response = %response, "Notified ingest service");
        Ok(())
    }

    fn batches_loaded(&self) -> u64 {
        self.batches
    }
}
