//! Configuration for the drift batch loader.
//!
//! Everything arrives on the command line, with environment-variable
//! fallbacks for connection parameters so credentials stay out of shell
//! history. Validation runs before any input is read.

use std::num::NonZeroUsize;

use clap::Parser;

use crate::error::ConfigError;
use crate::load::LoaderKind;

/// Command-line arguments for the drift binary.
#[derive(Debug, Parser)]
#[command(name = "drift", about = "Batch loader for NDJSON credit-transaction records")]
pub struct CliArgs {
    /// Number of records per batch.
    pub batch_size: usize,

    /// Loading strategy: a synchronous COPY per batch, or an asynchronous
    /// ingest-pipe notification.
    #[arg(long, value_enum, default_value = "copy")]
    pub loader: LoaderKind,

    /// Warehouse REST endpoint, e.g. https://account.example.com
    #[arg(long, env = "DRIFT_ENDPOINT")]
    pub endpoint: String,

    /// Bearer token for warehouse requests.
    #[arg(long, env = "DRIFT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Stage area URL (local path or object-store URL such as s3://bucket/stage).
    #[arg(long, env = "DRIFT_STAGE_URL")]
    pub stage_url: String,

    /// Destination table name.
    #[arg(long, env = "DRIFT_TABLE", default_value = "CONSUMER_CREDIT_RECORDS")]
    pub table: String,

    /// Ingest pipe name, required by the pipe loader.
    #[arg(long, env = "DRIFT_PIPE")]
    pub pipe: Option<String>,
}

/// Warehouse connection parameters.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// REST endpoint base URL.
    pub endpoint: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// Stage area URL.
    pub stage_url: String,
    /// Ingest pipe name, if any.
    pub pipe: Option<String>,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Records per batch; always at least one.
    pub batch_size: NonZeroUsize,
    /// Loading strategy.
    pub loader: LoaderKind,
    /// Destination table name.
    pub table: String,
    /// Warehouse connection parameters.
    pub warehouse: WarehouseConfig,
}

impl Config {
    /// Validate command-line arguments into a run configuration.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let batch_size = NonZeroUsize::new(args.batch_size).ok_or(ConfigError::InvalidBatchSize)?;

        if args.endpoint.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if args.stage_url.is_empty() {
            return Err(ConfigError::EmptyStageUrl);
        }
        if args.table.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        if args.loader == LoaderKind::Pipe && args.pipe.is_none() {
            return Err(ConfigError::MissingPipe);
        }

        Ok(Self {
            batch_size,
            loader: args.loader,
            table: args.table,
            warehouse: WarehouseConfig {
                endpoint: args.endpoint,
                token: args.token,
                stage_url: args.stage_url,
                pipe: args.pipe,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(batch_size: usize, loader: LoaderKind, pipe: Option<&str>) -> CliArgs {
        CliArgs {
            batch_size,
            loader,
            endpoint: "https://warehouse.example.com".to_string(),
            token: None,
            stage_url: "/tmp/stage".to_string(),
            table: "CONSUMER_CREDIT_RECORDS".to_string(),
            pipe: pipe.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = Config::from_args(args(100, LoaderKind::Copy, None)).unwrap();
        assert_eq!(config.batch_size.get(), 100);
        assert_eq!(config.loader, LoaderKind::Copy);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Config::from_args(args(0, LoaderKind::Copy, None)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize));
    }

    #[test]
    fn test_pipe_loader_requires_pipe_name() {
        let err = Config::from_args(args(10, LoaderKind::Pipe, None)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPipe));

        let config = Config::from_args(args(10, LoaderKind::Pipe, Some("CREDIT_PIPE"))).unwrap();
        assert_eq!(config.warehouse.pipe.as_deref(), Some("CREDIT_PIPE"));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let mut a = args(10, LoaderKind::Copy, None);
        a.endpoint = String::new();
        assert!(matches!(
            Config::from_args(a).unwrap_err(),
            ConfigError::EmptyEndpoint
        ));
    }
}
