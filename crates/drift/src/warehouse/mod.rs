//! Warehouse client abstraction.
//!
//! The pipeline talks to the warehouse through three verbs: stage a local
//! file, execute a statement, and notify the ingest service of a staged
//! file. The trait keeps the loaders independent of the concrete transport
//! and lets tests inject failures at any step.

mod rest;
mod stage;

pub use rest::RestWarehouse;
pub use stage::StageArea;

use std::path::Path;

use async_trait::async_trait;

use crate::error::{NotifyError, StageError, StatementError};

/// Client contract for the destination warehouse.
///
/// One connection is opened at startup, shared across every batch of the
/// run, and closed exactly once at shutdown.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Upload a local file to the stage area under `name`.
    ///
    /// Returns the staged object name.
    async fn stage_file(&self, local: &Path, name: &str) -> Result<String, StageError>;

    /// Execute a statement and return once the warehouse confirms it.
    async fn execute(&self, statement: &str) -> Result<(), StatementError>;

    /// Notify the ingest service of a newly staged file.
    ///
    /// Returns the service's acknowledgement code. The actual load happens
    /// out of band; this only guarantees the notification was acknowledged.
    async fn notify_ingest(&self, staged_name: &str) -> Result<String, NotifyError>;

    /// Release the connection. Idempotent.
    async fn close(&self);
}
