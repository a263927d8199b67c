//! Network reachability probes.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Answers "can the collector be reached right now?"
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Probes `GET {base}/health`; any 2xx within the timeout means online
pub struct HttpProbe {
    health_url: String,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            health_url: format!("{}/health", base_url.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl Connectivity for HttpProbe {
    async fn is_online(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Reachability probe failed: {}", e);
                false
            }
        }
    }
}

/// Fixed answer, for forced-offline runs and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

#[async_trait]
impl Connectivity for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.0
    }
}
