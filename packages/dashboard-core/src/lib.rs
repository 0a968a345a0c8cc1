//! Cloud Cost Dashboard Core
//!
//! Client-side core of a cloud cost optimization dashboard: it pulls
//! resources, recommendations and cost analytics from the optimization
//! service, derives headline figures, and serves an interactive, filterable
//! view of the resource fleet.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dashboard_core::{DataCoordinator, ResourceExplorer};
//! use dashboard_core::testing::MockOptimizationApi;
//!
//! let coordinator = DataCoordinator::new(Arc::new(MockOptimizationApi::new()));
//! coordinator.load(false).await;
//!
//! let state = coordinator.snapshot();
//! let overview = state.overview();
//! let explorer = ResourceExplorer::new(state.resources.data().clone());
//! explorer.input_search("web");
//! ```
//!
//! # Modules
//!
//! - [`coordinator`] - Concurrent, time-bounded loading of every source
//! - [`state`] - Per-source loading/error/data state
//! - [`metrics`] - Formatting, classification and aggregate figures
//! - [`query`] - Search, filter and sort over resources
//! - [`explorer`] - Debounced interactive resource view
//! - [`recommendations`] - Session-local "implemented" toggles
//! - [`source`] - The `OptimizationApi` data source trait
//! - [`testing`] - Mock implementations for testing

pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod explorer;
pub mod metrics;
pub mod query;
pub mod recommendations;
pub mod source;
pub mod state;
pub mod testing;
pub mod types;

pub use coordinator::{BackendHealth, CoordinatorConfig, DataCoordinator, DEFAULT_FETCH_TIMEOUT};
pub use debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE};
pub use error::{FetchError, FetchResult};
pub use explorer::{ResourceExplorer, ViewCounts};
pub use metrics::{
    classify, derive_overview, format_currency, format_percentage, health_score,
    DashboardOverview, HealthAssessment, SavingsBreakdown, UtilizationStatus,
};
pub use query::{Filter, ResourceQuery, SortDirection, SortField};
pub use recommendations::RecommendationStore;
pub use source::{OptimizationApi, SourceKind};
pub use state::{DashboardState, SourceFailure, SourcePhase, SourceState};
pub use types::{
    ConfidenceLevel, CostAnalytics, CostBucket, HealthInfo, OptimizationPotential,
    OptimizationSummary, Provider, Recommendation, Resource, ResourceHealth, ResourceType,
};
