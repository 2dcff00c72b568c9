//! Error types for the drift batch loader.

use snafu::prelude::*;

// Re-export the decode error from drift-common
pub use drift_common::record::RecordError;

/// Errors that can occur during configuration validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Batch size must be at least one record.
    #[snafu(display("Batch size must be a positive integer"))]
    InvalidBatchSize,

    /// Warehouse endpoint is empty.
    #[snafu(display("Warehouse endpoint cannot be empty"))]
    EmptyEndpoint,

    /// Stage URL is empty.
    #[snafu(display("Stage URL cannot be empty"))]
    EmptyStageUrl,

    /// Destination table is empty.
    #[snafu(display("Destination table cannot be empty"))]
    EmptyTable,

    /// The pipe loader needs an ingest pipe name.
    #[snafu(display("An ingest pipe name is required for the pipe loader"))]
    MissingPipe,
}

/// Errors that can occur while encoding a batch to Parquet.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EncodeError {
    /// Empty batches are never encoded.
    #[snafu(display("Refusing to encode an empty batch"))]
    EmptyBatch,

    /// Failed to assemble the Arrow record batch.
    #[snafu(display("Failed to assemble record batch: {source}"))]
    BatchAssembly { source: arrow::error::ArrowError },

    /// Failed to create the output file.
    #[snafu(display("Failed to create {path}: {source}"))]
    FileCreate {
        path: String,
        source: std::io::Error,
    },

    /// Failed to create the Parquet writer.
    #[snafu(display("Failed to create Parquet writer: {source}"))]
    WriterCreate {
        source: parquet::errors::ParquetError,
    },

    /// Failed to write Parquet data.
    #[snafu(display("Failed to write Parquet data: {source}"))]
    ParquetWrite {
        source: parquet::errors::ParquetError,
    },
}

/// Errors that can occur while uploading a file to the stage area.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StageError {
    /// The stage URL could not be parsed.
    #[snafu(display("Invalid stage URL {url}: {message}"))]
    InvalidStageUrl { url: String, message: String },

    /// Failed to create the local stage directory.
    #[snafu(display("Failed to create stage directory {path}: {source}"))]
    StageDir {
        path: String,
        source: std::io::Error,
    },

    /// Failed to read the local file for upload.
    #[snafu(display("Failed to read {path} for staging: {source}"))]
    ReadLocal {
        path: String,
        source: std::io::Error,
    },

    /// The upload itself failed.
    #[snafu(display("Failed to upload {name} to stage: {source}"))]
    Upload {
        name: String,
        source: object_store::Error,
    },
}

/// Errors that can occur while executing a warehouse statement.
// Variant names are prefixed to avoid snafu selector conflicts with
// NotifyError (e.g., RequestSnafu).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StatementError {
    /// The statement request could not be sent.
    #[snafu(display("Failed to submit statement: {source}"))]
    StatementRequest { source: reqwest::Error },

    /// The warehouse rejected the statement.
    #[snafu(display("Warehouse rejected statement ({status}): {body}"))]
    StatementRejected { status: u16, body: String },
}

/// Errors that can occur while notifying the ingest service.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NotifyError {
    /// No ingest pipe is configured on this connection.
    #[snafu(display("No ingest pipe configured"))]
    PipeUnconfigured,

    /// The notification request could not be sent.
    #[snafu(display("Failed to notify ingest service: {source}"))]
    NotifyRequest { source: reqwest::Error },

    /// The ingest service rejected the notification.
    #[snafu(display("Ingest service rejected notification ({status})"))]
    NotifyRejected { status: u16 },

    /// The acknowledgement could not be decoded.
    #[snafu(display("Failed to decode ingest acknowledgement: {source}"))]
    NotifyResponse { source: reqwest::Error },
}

/// A batch load failure, carrying the step at which it failed together with
/// the batch sequence number and staged file name.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LoadError {
    /// Encoding the batch to Parquet failed.
    #[snafu(display("Batch {batch}: encode failed: {source}"))]
    Encode { batch: u64, source: EncodeError },

    /// Uploading the encoded file to the stage failed.
    #[snafu(display("Batch {batch}: staging {file} failed: {source}"))]
    Stage {
        batch: u64,
        file: String,
        source: StageError,
    },

    /// The load statement failed.
    #[snafu(display("Batch {batch}: load statement for {file} failed: {source}"))]
    Copy {
        batch: u64,
        file: String,
        source: StatementError,
    },

    /// The ingest notification failed.
    #[snafu(display("Batch {batch}: ingest notification for {file} failed: {source}"))]
    Notify {
        batch: u64,
        file: String,
        source: NotifyError,
    },
}

impl LoadError {
    /// The pipeline step at which the load failed.
    pub fn step(&self) -> &'static str {
        match self {
            LoadError::Encode { .. } => "encode",
            LoadError::Stage { .. } => "stage",
            LoadError::Copy { .. } => "copy",
            LoadError::Notify { .. } => "notify",
        }
    }

    /// The sequence number of the batch that failed.
    pub fn batch(&self) -> u64 {
        match self {
            LoadError::Encode { batch, .. }
            | LoadError::Stage { batch, .. }
            | LoadError::Copy { batch, .. }
            | LoadError::Notify { batch, .. } => *batch,
        }
    }
}

/// Top-level pipeline errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error, raised before any input is read.
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    /// A line of input could not be decoded.
    #[snafu(display("Line {line}: {source}"))]
    Record { line: u64, source: RecordError },

    /// Reading from the input stream failed.
    #[snafu(display("Failed to read input: {source}"))]
    InputRead { source: std::io::Error },

    /// The scratch directory could not be created.
    #[snafu(display("Failed to create scratch directory: {source}"))]
    Scratch { source: std::io::Error },

    /// The stage area could not be opened.
    #[snafu(display("Stage area error: {source}"))]
    StageArea { source: StageError },

    /// The warehouse HTTP client could not be constructed.
    #[snafu(display("Failed to construct warehouse client: {source}"))]
    Connect { source: reqwest::Error },

    /// A batch load failed. The source identifies the batch and the step.
    #[snafu(display("Load failed: {source}"))]
    Load { source: LoadError },
}

impl From<ConfigError> for PipelineError {
    fn from(source: ConfigError) -> Self {
        PipelineError::Config { source }
    }
}

impl From<LoadError> for PipelineError {
    fn from(source: LoadError) -> Self {
        PipelineError::Load { source }
    }
}

impl From<StageError> for PipelineError {
    fn from(source: StageError) -> Self {
        PipelineError::StageArea { source }
    }
}
