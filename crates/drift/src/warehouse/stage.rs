//! Stage area upload backend.
//!
//! The stage is addressed by URL: plain paths and `file://` URLs resolve to
//! the local filesystem, anything else (`s3://`, `gs://`, `az://`) goes
//! through the matching object-store backend with credentials taken from
//! the environment.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use snafu::prelude::*;
use url::Url;

use crate::error::{ReadLocalSnafu, StageDirSnafu, StageError, UploadSnafu};

/// Upload target for encoded batch files.
#[derive(Clone)]
pub struct StageArea {
    store: Arc<dyn ObjectStore>,
    prefix: StorePath,
    url: String,
}

impl std::fmt::Debug for StageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StageArea<{}>", self.url)
    }
}

impl StageArea {
    /// Open the stage area for the given URL or local path.
    pub fn for_url(url: &str) -> Result<Self, StageError> {
        if url.contains("://") {
            let parsed = Url::parse(url).map_err(|e| StageError::InvalidStageUrl {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            let (store, prefix) =
                object_store::parse_url(&parsed).map_err(|e| StageError::InvalidStageUrl {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            Ok(Self {
                store: Arc::from(store),
                prefix,
                url: url.to_string(),
            })
        } else {
            // Bare path: a local stage directory, created on first use.
            std::fs::create_dir_all(url).context(StageDirSnafu { path: url })?;
            let store = LocalFileSystem::new_with_prefix(url).map_err(|e| {
                StageError::InvalidStageUrl {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?;

            Ok(Self {
                store: Arc::new(store),
                prefix: StorePath::default(),
                url: url.to_string(),
            })
        }
    }

    /// Upload a local file to the stage under `name` and return the staged
    /// object name.
    pub async fn put_file(&self, local: &Path, name: &str) -> Result<String, StageError> {
        let bytes = tokio::fs::read(local).await.context(ReadLocalSnafu {
            path: local.display().to_string(),
        })?;

        let target = self.prefix.child(name);
        self.store
            .put(&target, PutPayload::from(Bytes::from(bytes)))
            .await
            .context(UploadSnafu { name })?;

        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_file_to_local_stage() {
        let stage_dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();

        let local = scratch.path().join("batch.parquet");
        std::fs::write(&local, b"parquet bytes").unwrap();

        let stage = StageArea::for_url(stage_dir.path().to_str().unwrap()).unwrap();
        let staged = stage.put_file(&local, "batch.parquet").await.unwrap();

        assert_eq!(staged, "batch.parquet");
        let uploaded = std::fs::read(stage_dir.path().join("batch.parquet")).unwrap();
        assert_eq!(uploaded, b"parquet bytes");
    }

    #[tokio::test]
    async fn test_creates_missing_local_stage_dir() {
        let parent = TempDir::new().unwrap();
        let stage_path = parent.path().join("stage/nested");

        let stage = StageArea::for_url(stage_path.to_str().unwrap()).unwrap();
        assert!(stage_path.is_dir());

        let local = parent.path().join("f.parquet");
        std::fs::write(&local, b"x").unwrap();
        stage.put_file(&local, "f.parquet").await.unwrap();
        assert!(stage_path.join("f.parquet").exists());
    }

    #[tokio::test]
    async fn test_missing_local_file_is_an_error() {
        let stage_dir = TempDir::new().unwrap();
        let stage = StageArea::for_url(stage_dir.path().to_str().unwrap()).unwrap();

        let err = stage
            .put_file(Path::new("/nonexistent/file.parquet"), "f.parquet")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::ReadLocal { .. }));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = StageArea::for_url("not a scheme://///").unwrap_err();
        assert!(matches!(err, StageError::InvalidStageUrl { .. }));
    }
}
