//! HTTP implementation of [`RemoteBlobStore`].
//!
//! Talks to the webhook endpoints derived from [`RemoteConfig`]:
//! `POST {base_url}/save-data` with the export document as body and
//! `GET {base_url}/get-data` returning `[{"data": {...}}, ...]`.

use std::time::Duration;

use async_trait::async_trait;
use kurasi_core::config::RemoteConfig;
use kurasi_core::remote::{RemoteBlobStore, RemoteRecord};
use kurasi_core::{KurasiError, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

/// Remote blob store reached over HTTP.
pub struct HttpBlobStore {
    client: Client,
    save_url: String,
    get_url: String,
}

fn transport_error(url: &str, e: reqwest::Error) -> KurasiError {
    if e.is_timeout() {
        KurasiError::transport(format!("Request to {} timed out", url))
    } else if e.is_connect() {
        KurasiError::transport(format!("Cannot connect to {}: {}", url, e))
    } else {
        KurasiError::transport(format!("Request to {} failed: {}", url, e))
    }
}

impl HttpBlobStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KurasiError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            save_url: config.save_url(),
            get_url: config.get_url(),
        })
    }

    pub fn save_url(&self) -> &str {
        &self.save_url
    }

    pub fn get_url(&self) -> &str {
        &self.get_url
    }
}

#[async_trait]
impl RemoteBlobStore for HttpBlobStore {
    async fn store(&self, blob: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.save_url)
            .header(CONTENT_TYPE, "application/json")
            .body(blob.to_string())
            .send()
            .await
            .map_err(|e| transport_error(&self.save_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KurasiError::transport(format!(
                "Remote store rejected upload (status: {})",
                status
            )));
        }
        tracing::debug!("Uploaded {} bytes to {}", blob.len(), self.save_url);
        Ok(())
    }

    async fn retrieve(&self) -> Result<Vec<RemoteRecord>> {
        let response = self
            .client
            .get(&self.get_url)
            .send()
            .await
            .map_err(|e| transport_error(&self.get_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KurasiError::transport(format!(
                "Remote store rejected download (status: {})",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&self.get_url, e))?;
        let records: Vec<RemoteRecord> = serde_json::from_str(&body).map_err(|e| {
            KurasiError::json(format!("Unexpected response from {}: {}", self.get_url, e))
        })?;
        tracing::debug!("Retrieved {} records from {}", records.len(), self.get_url);
        Ok(records)
    }
}
