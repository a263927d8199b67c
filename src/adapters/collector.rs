//! HTTP client for the remote report collector.
//!
//! Endpoint: POST {base}/api/reports
//! Body: the persisted report as JSON. Any 2xx counts as accepted; the
//! response body is not read on success.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Report;

/// Why the collector did not accept a report
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Collector rejected report ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Remote sink for synced reports
#[async_trait]
pub trait Collector: Send + Sync {
    /// Human-readable collector name
    fn name(&self) -> &str;

    /// Submit one report; `Ok` means the collector accepted it
    async fn submit(&self, report: &Report) -> Result<(), CollectorError>;
}

/// Collector reached over HTTP
pub struct HttpCollector {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCollector {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build API URL
    fn reports_url(&self) -> String {
        format!("{}/api/reports", self.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Collector for HttpCollector {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, report: &Report) -> Result<(), CollectorError> {
        let response = self
            .client
            .post(self.reports_url())
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(CollectorError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}
