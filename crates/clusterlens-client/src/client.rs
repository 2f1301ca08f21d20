//! Cluster HTTP client facade
//!
//! Wraps a reqwest client around the settings store: every request is issued
//! against the effective host with the derived authorization headers. No
//! retries or failover, failures surface to the caller immediately.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{ClientError, Result};
use crate::model::{ClusterInfo, TaskGroupBy, TaskListResponse};
use crate::store::SettingsStore;

/// Configuration for the cluster HTTP client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
        }
    }
}

impl ClientConfig {
    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }
}

/// HTTP client for the active cluster connection
pub struct ClusterClient {
    client: reqwest::Client,
    store: Arc<SettingsStore>,
}

impl ClusterClient {
    /// Create a client with default timeouts
    pub fn new(store: Arc<SettingsStore>) -> Result<Self> {
        Self::with_config(store, ClientConfig::default())
    }

    /// Create a client with explicit timeouts
    pub fn with_config(store: Arc<SettingsStore>, config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self { client, store })
    }

    /// The settings store backing this client
    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    /// Liveness check against the cluster root endpoint.
    ///
    /// Resolves only when the response carries a string `tagline`, the
    /// signature of a healthy search cluster. A successful check persists
    /// the active settings for the next session.
    pub async fn ping(&self) -> Result<ClusterInfo> {
        let url = self.base_url()?;
        debug!(%url, "pinging cluster");

        let response = self.apply_auth(self.client.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        match body.get("tagline").and_then(|v| v.as_str()) {
            Some(_) => {
                let info: ClusterInfo = serde_json::from_value(body)?;
                self.store.persist()?;
                Ok(info)
            }
            None => Err(ClientError::UnrecognizedCluster { url }),
        }
    }

    /// List the tasks currently executing on the cluster.
    ///
    /// The response shape is not validated beyond lenient deserialization;
    /// transport failures propagate unchanged.
    pub async fn list_tasks(&self, group_by: TaskGroupBy) -> Result<TaskListResponse> {
        // human and detailed are valueless flags, build the query by hand
        let url = format!(
            "{}/_tasks?human&detailed&group_by={}",
            self.base_url()?,
            group_by.as_str()
        );
        debug!(%url, "listing tasks");

        let response = self.apply_auth(self.client.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    fn base_url(&self) -> Result<String> {
        self.store.effective_host().ok_or(ClientError::MissingHost)
    }

    fn apply_auth(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in self.store.auth_headers() {
            request = request.header(name, value);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySettingsStorage;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.read_timeout_ms, 30000);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::default().with_timeouts(3000, 15000);
        assert_eq!(config.connect_timeout_ms, 3000);
        assert_eq!(config.read_timeout_ms, 15000);
    }

    #[tokio::test]
    async fn test_requests_require_a_host() {
        let store = Arc::new(SettingsStore::new(Arc::new(MemorySettingsStorage::new())));
        let client = ClusterClient::new(store).unwrap();

        assert!(matches!(client.ping().await, Err(ClientError::MissingHost)));
        assert!(matches!(
            client.list_tasks(TaskGroupBy::None).await,
            Err(ClientError::MissingHost)
        ));
    }
}
