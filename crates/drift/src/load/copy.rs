//! Synchronous bulk-copy loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use snafu::prelude::*;
use tracing::info;

use drift_common::Record;

use crate::error::{CopySnafu, LoadError};
use crate::warehouse::Warehouse;

use super::{stage_batch, Loader};

/// Loads each batch with an explicit COPY statement.
///
/// The statement matches columns by name, case-sensitively, and purges the
/// staged file after a successful load, so nothing is left behind in the
/// stage. Returns only after the warehouse confirms execution.
pub struct CopyLoader {
    warehouse: Arc<dyn Warehouse>,
    scratch: PathBuf,
    table: String,
    batches: u64,
}

impl CopyLoader {
    /// Create a loader writing scratch files under `scratch` and loading
    /// into `table`.
    pub fn new(warehouse: Arc<dyn Warehouse>, scratch: &Path, table: &str) -> Self {
        Self {
            warehouse,
            scratch: scratch.to_path_buf(),
            table: table.to_string(),
            batches: 0,
        }
    }
}

fn copy_statement(table: &str) -> String {
    format!(
        "COPY INTO {table} FILE_FORMAT=(TYPE='PARQUET') MATCH_BY_COLUMN_NAME=CASE_SENSITIVE PURGE=TRUE"
    )
}

#[async_trait]
impl Loader for CopyLoader {
    async fn load_batch(&mut self, records: Vec<Record>) -> Result<(), LoadError> {
        let batch = self.batches + 1;
        info!(batch, records = records.len(), "Preparing batch for load");

        let staged = stage_batch(self.warehouse.as_ref(), &self.scratch, batch, &records).await?;

        self.warehouse
            .execute(&copy_statement(&self.table))
            .await
            .context(CopySnafu {
                batch,
                file: staged.clone(),
            })?;

        self.batches = batch;
        info!(batch, records = records.len(), file = %staged, "Loaded batch");
        Ok(())
    }

    fn batches_loaded(&self) -> u64 {
        self.batches
    }
}
