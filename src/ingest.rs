// src/ingest.rs
//
// Seam to the ingestion collaborator. The handler only ever hands over a
// content digest and forwards whatever JSON comes back.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::UploadError;

#[derive(Serialize)]
struct IngestRequest<'a> {
    digest: &'a str,
}

#[async_trait]
pub trait IngestClient: Send + Sync {
    async fn ingest(&self, digest: &str) -> Result<Value, UploadError>;
}

/// Ingestion reached over HTTP: POST `{"digest": ...}` to the configured
/// endpoint, return its JSON body verbatim.
pub struct HttpIngestClient {
    client: reqwest::Client,
    url: String,
}

impl HttpIngestClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| UploadError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl IngestClient for HttpIngestClient {
    async fn ingest(&self, digest: &str) -> Result<Value, UploadError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&IngestRequest { digest })
            .send()
            .await
            .map_err(|e| UploadError::ingest(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UploadError::ingest(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UploadError::ingest(e.to_string()))
    }
}
