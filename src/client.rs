// src/client.rs
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::config::{AppConfig, EvalJobConfig};
use crate::errors::{EvalError, Result};
use crate::models::{self, BatchList, ResultSet, SubmitResponse};

/// Source of batch status listings. The poller only needs this one call, so
/// it depends on the trait rather than the whole client.
///
/// Note: We're not using async_trait here, so implementers must handle async directly.
pub trait BatchSource: Send + Sync {
    /// Lists batch statuses, optionally restricted server-side to one status.
    fn list_batches(
        &self,
        status: Option<&str>,
    ) -> impl std::future::Future<Output = Result<BatchList>> + Send;
}

/// Authenticated client for the remote eval API.
pub struct ApiClient {
    client: Client,
    config: AppConfig,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    pub fn new(client: Client, config: AppConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_root(), path)
    }

    /// Submits the job description, creating server-side batches.
    pub async fn submit(&self, job: &EvalJobConfig) -> Result<SubmitResponse> {
        let url = self.endpoint("submit");
        debug!("📡 POST {}", url);
        if self.config.debug {
            debug!("submit payload: {}", job.payload());
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(job.payload())
            .send()
            .await?;

        let raw = read_json(resp, &url).await?;
        models::from_normalized(raw)
    }

    /// Fetches the detailed per-record results for one batch.
    pub async fn get_results(&self, batch_id: &str) -> Result<ResultSet> {
        let url = self.endpoint(&format!("{batch_id}/results"));
        debug!("📡 GET {}", url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let raw = read_json(resp, &url).await?;
        models::from_normalized(raw)
    }
}

impl BatchSource for ApiClient {
    async fn list_batches(&self, status: Option<&str>) -> Result<BatchList> {
        let url = self.endpoint("batches");
        debug!("📡 GET {}", url);

        let mut req = self.client.get(&url).bearer_auth(&self.config.api_key);
        if let Some(status) = status {
            req = req.query(&[("status", status)]);
        }
        let resp = req.send().await?;

        let raw = read_json(resp, &url).await?;
        models::from_normalized(raw)
    }
}

/// Shared response handling: non-success captures the status and body text,
/// with 404 mapped to the variant whose message spells out likely causes.
async fn read_json(resp: Response, url: &str) -> Result<Value> {
    let status = resp.status();
    debug!("📥 {} → {}", url, status);

    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        if status == StatusCode::NOT_FOUND {
            return Err(EvalError::ApiNotFound {
                url: url.to_string(),
                body,
            });
        }
        return Err(EvalError::ApiError {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.json().await?)
}
