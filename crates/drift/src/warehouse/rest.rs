//! REST warehouse client.
//!
//! Statements go to the warehouse's SQL endpoint; ingest notifications go
//! to the pipe's `insertFiles` endpoint; staged files are uploaded through
//! the configured [`StageArea`]. Authentication is a bearer token taken
//! from the environment at startup.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use snafu::prelude::*;
use tracing::debug;
use uuid::Uuid;

use crate::config::WarehouseConfig;
use crate::error::{
    ConnectSnafu, NotifyError, NotifyRejectedSnafu, NotifyRequestSnafu, NotifyResponseSnafu,
    PipeUnconfiguredSnafu, PipelineError, StageError, StatementError, StatementRejectedSnafu,
    StatementRequestSnafu,
};
use crate::warehouse::{StageArea, Warehouse};

/// Seconds the warehouse may spend executing one statement.
const STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Acknowledgement returned by the ingest service.
#[derive(Debug, Deserialize)]
struct IngestAck {
    #[serde(rename = "responseCode")]
    response_code: String,
}

/// Warehouse client speaking REST for statements and notifications, with an
/// object-store-backed stage area.
pub struct RestWarehouse {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    pipe: Option<String>,
    stage: StageArea,
    closed: AtomicBool,
}

impl RestWarehouse {
    /// Open a connection from the run configuration.
    pub fn connect(config: &WarehouseConfig) -> Result<Self, PipelineError> {
        let stage = StageArea::for_url(&config.stage_url)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(STATEMENT_TIMEOUT_SECS + 30))
            .build()
            .context(ConnectSnafu)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            pipe: config.pipe.clone(),
            stage,
            closed: AtomicBool::new(false),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl Warehouse for RestWarehouse {
    async fn stage_file(&self, local: &Path, name: &str) -> Result<String, StageError> {
        let staged = self.stage.put_file(local, name).await?;
        debug!(file = %staged, "Staged file");
        Ok(staged)
    }

    async fn execute(&self, statement: &str) -> Result<(), StatementError> {
        let url = format!("{}/api/v2/statements", self.endpoint);
        let body = json!({
            "statement": statement,
            "timeout": STATEMENT_TIMEOUT_SECS,
        });

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await
            .context(StatementRequestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return StatementRejectedSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        Ok(())
    }

    async fn notify_ingest(&self, staged_name: &str) -> Result<String, NotifyError> {
        let pipe = self.pipe.as_deref().context(PipeUnconfiguredSnafu)?;

        // Fresh request id per notification so the service can deduplicate
        // retried requests without collapsing distinct batches.
        let url = format!(
            "{}/v1/data/pipes/{}/insertFiles?requestId={}",
            self.endpoint,
            pipe,
            Uuid::new_v4()
        );
        let body = json!({ "files": [ { "path": staged_name } ] });

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await
            .context(NotifyRequestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            return NotifyRejectedSnafu {
                status: status.as_u16(),
            }
            .fail();
        }

        let ack: IngestAck = response.json().await.context(NotifyResponseSnafu)?;
        Ok(ack.response_code)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Warehouse connection closed");
        }
    }
}
