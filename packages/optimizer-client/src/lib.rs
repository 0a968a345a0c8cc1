//! HTTP client for the cloud cost optimization service.
//!
//! Implements [`OptimizationApi`] over the service's REST endpoints. Every
//! failure is converted into a [`FetchError`] before it reaches the dashboard.
//!
//! # Example
//!
//! ```rust,ignore
//! use optimizer_client::OptimizerClient;
//!
//! let client = OptimizerClient::new("http://localhost:8000/api/v1", "http://localhost:8000/health");
//!
//! let resources = client.get_resources().await?;
//! for resource in &resources {
//!     println!("{} ({})", resource.name, resource.provider);
//! }
//! ```

pub mod error;

pub use error::{ClientError, Result};

use std::time::Duration;

use async_trait::async_trait;
use dashboard_core::{
    CostAnalytics, FetchError, FetchResult, HealthInfo, OptimizationApi, OptimizationSummary,
    Resource, ResourceHealth,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_HEALTH_URL: &str = "http://localhost:8000/health";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error payload returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub struct OptimizerClient {
    client: reqwest::Client,
    base_url: String,
    health_url: String,
}

impl OptimizerClient {
    pub fn new(base_url: impl Into<String>, health_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, health_url)
    }

    /// Use a preconfigured `reqwest::Client`, e.g. one with a transport timeout.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        health_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            health_url: health_url.into(),
        }
    }

    /// Client whose transport gives up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        health_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, health_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_resources(&self) -> Result<Vec<Resource>> {
        self.get(&format!("{}/resources", self.base_url)).await
    }

    pub async fn get_recommendations(&self) -> Result<OptimizationSummary> {
        self.get(&format!("{}/recommendations", self.base_url))
            .await
    }

    pub async fn get_cost_summary(&self) -> Result<CostAnalytics> {
        self.get(&format!("{}/analytics/cost-summary", self.base_url))
            .await
    }

    pub async fn get_health(&self) -> Result<HealthInfo> {
        self.get(&self.health_url).await
    }

    pub async fn get_resource_health(&self, resource_id: i64) -> Result<ResourceHealth> {
        self.get(&format!("{}/resources/{}/health", self.base_url, resource_id))
            .await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(url, status = status.as_u16(), "Request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}

fn classified<T>(endpoint: &'static str, result: Result<T>) -> FetchResult<T> {
    result.map_err(|e| {
        let error = FetchError::from(e);
        tracing::debug!(endpoint, category = error.category(), "Request failed");
        error
    })
}

#[async_trait]
impl OptimizationApi for OptimizerClient {
    async fn fetch_resources(&self) -> FetchResult<Vec<Resource>> {
        classified("resources", self.get_resources().await)
    }

    async fn fetch_recommendations(&self) -> FetchResult<OptimizationSummary> {
        classified("recommendations", self.get_recommendations().await)
    }

    async fn fetch_cost_analytics(&self) -> FetchResult<CostAnalytics> {
        classified("cost_summary", self.get_cost_summary().await)
    }

    async fn fetch_health(&self) -> FetchResult<HealthInfo> {
        classified("health", self.get_health().await)
    }

    async fn fetch_resource_health(&self, resource_id: i64) -> FetchResult<ResourceHealth> {
        classified("resource_health", self.get_resource_health(resource_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "Resource with ID 7 not found"}"#).as_deref(),
            Some("Resource with ID 7 not found")
        );
        assert_eq!(error_detail(r#"{"detail": null}"#), None);
        assert_eq!(error_detail("<html>bad gateway</html>"), None);
        assert!(error_detail(r#"{"detail": [{"msg": "field required"}]}"#)
            .unwrap()
            .contains("field required"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OptimizerClient::new("http://localhost:8000/api/v1/", DEFAULT_HEALTH_URL);
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
    }
}
