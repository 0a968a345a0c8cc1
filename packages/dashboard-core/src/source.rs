// Data source trait for the optimization service
//
// Infrastructure only: each method is one read endpoint. Timeouts, state
// transitions and logging live in the coordinator, not in implementations.

use std::fmt;

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::{CostAnalytics, HealthInfo, OptimizationSummary, Resource, ResourceHealth};

// =============================================================================
// Optimization API
// =============================================================================

#[async_trait]
pub trait OptimizationApi: Send + Sync {
    /// All monitored resources
    async fn fetch_resources(&self) -> FetchResult<Vec<Resource>>;

    /// Recommendations with service-computed totals
    async fn fetch_recommendations(&self) -> FetchResult<OptimizationSummary>;

    /// Cost breakdown by type and provider
    async fn fetch_cost_analytics(&self) -> FetchResult<CostAnalytics>;

    /// Service liveness
    async fn fetch_health(&self) -> FetchResult<HealthInfo>;

    /// Health score for one resource
    async fn fetch_resource_health(&self, resource_id: i64) -> FetchResult<ResourceHealth>;
}

// =============================================================================
// Source identity
// =============================================================================

/// The independently loaded data sources of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Resources,
    Recommendations,
    Analytics,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Resources => "Resources",
            SourceKind::Recommendations => "Recommendations",
            SourceKind::Analytics => "Cost analytics",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Resources => "resources",
            SourceKind::Recommendations => "recommendations",
            SourceKind::Analytics => "analytics",
        }
    }

    pub fn variants() -> &'static [SourceKind] {
        &[
            SourceKind::Resources,
            SourceKind::Recommendations,
            SourceKind::Analytics,
        ]
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
