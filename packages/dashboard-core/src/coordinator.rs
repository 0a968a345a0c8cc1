//! Data acquisition
//!
//! `DataCoordinator` loads every source concurrently, races each fetch
//! against a per-source timeout and records the outcome independently, so
//! one failed source never blocks the others.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchResult};
use crate::source::{OptimizationApi, SourceKind};
use crate::state::{DashboardState, SourceState};
use crate::types::{HealthInfo, ResourceHealth};

/// Per-source fetch deadline.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub fetch_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Outcome of a liveness check.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendHealth {
    Reachable(HealthInfo),
    Unreachable(FetchError),
}

impl BackendHealth {
    pub fn is_reachable(&self) -> bool {
        matches!(self, BackendHealth::Reachable(_))
    }
}

/// Owns the dashboard state and drives every load cycle.
///
/// Cheap to clone; clones share state. Overlapping loads are not
/// serialized, so whichever fetch completes last wins for each source.
#[derive(Clone)]
pub struct DataCoordinator {
    api: Arc<dyn OptimizationApi>,
    state: Arc<RwLock<DashboardState>>,
    config: CoordinatorConfig,
}

impl DataCoordinator {
    pub fn new(api: Arc<dyn OptimizationApi>) -> Self {
        Self::with_config(api, CoordinatorConfig::default())
    }

    pub fn with_config(api: Arc<dyn OptimizationApi>, config: CoordinatorConfig) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(DashboardState::default())),
            config,
        }
    }

    pub fn config(&self) -> CoordinatorConfig {
        self.config
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load all sources concurrently. Completes once every source has either
    /// succeeded, failed or timed out.
    pub async fn load(&self, show_refresh_indicator: bool) {
        if show_refresh_indicator {
            self.update(|state| state.refreshing = true);
        }

        let started = Instant::now();
        info!(refresh = show_refresh_indicator, "Loading dashboard data");

        let resources_api = Arc::clone(&self.api);
        let recommendations_api = Arc::clone(&self.api);
        let analytics_api = Arc::clone(&self.api);

        futures::join!(
            self.load_source(
                SourceKind::Resources,
                async move { resources_api.fetch_resources().await },
                |state| &mut state.resources,
                |resources| resources,
            ),
            self.load_source(
                SourceKind::Recommendations,
                async move { recommendations_api.fetch_recommendations().await },
                |state| &mut state.recommendations,
                Into::into,
            ),
            self.load_source(
                SourceKind::Analytics,
                async move { analytics_api.fetch_cost_analytics().await },
                |state| &mut state.analytics,
                Some,
            ),
        );

        self.update(|state| {
            state.last_refresh = Some(Utc::now());
            if show_refresh_indicator {
                state.refreshing = false;
            }
        });

        let failed = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .failures()
            .len();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            failed,
            "Dashboard load complete"
        );
    }

    /// User-initiated reload. Discards any local recommendation toggles.
    pub async fn refresh(&self) {
        self.load(true).await;
    }

    /// Probe the service. Never touches dashboard state.
    pub async fn check_health(&self) -> BackendHealth {
        let api = Arc::clone(&self.api);
        match race_timeout(async move { api.fetch_health().await }, self.config.fetch_timeout).await
        {
            Ok(info) => {
                debug!(status = %info.status, version = %info.version, "Backend reachable");
                BackendHealth::Reachable(info)
            }
            Err(error) => {
                warn!(error = %error, "Backend health check failed");
                BackendHealth::Unreachable(error)
            }
        }
    }

    /// Health score for one resource, fetched on demand.
    pub async fn resource_health(&self, resource_id: i64) -> FetchResult<ResourceHealth> {
        let api = Arc::clone(&self.api);
        race_timeout(
            async move { api.fetch_resource_health(resource_id).await },
            self.config.fetch_timeout,
        )
        .await
    }

    /// Toggle the local "implemented" flag for a resource's recommendations.
    /// Returns how many recommendations changed.
    pub fn set_implemented(&self, resource_id: i64, implemented: bool) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .recommendations
            .data_mut()
            .set_implemented(resource_id, implemented)
    }

    async fn load_source<P, T, Fut>(
        &self,
        kind: SourceKind,
        fetch: Fut,
        slot: fn(&mut DashboardState) -> &mut SourceState<T>,
        into_data: fn(P) -> T,
    ) where
        Fut: Future<Output = FetchResult<P>> + Send + 'static,
        P: Send + 'static,
        T: Default,
    {
        self.update(|state| slot(state).begin());
        debug!(source = %kind, "Fetching source");

        let started = Instant::now();
        let outcome = race_timeout(fetch, self.config.fetch_timeout).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(payload) => {
                self.update(|state| slot(state).succeed(into_data(payload)));
                debug!(source = %kind, elapsed_ms, "Source loaded");
            }
            Err(error) => {
                warn!(
                    source = %kind,
                    category = error.category(),
                    error = %error,
                    elapsed_ms,
                    "Source failed"
                );
                self.update(|state| slot(state).fail(error));
            }
        }
    }

    fn update(&self, change: impl FnOnce(&mut DashboardState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut state);
    }
}

/// Race `fetch` against `timeout`.
///
/// The fetch runs on its own task and is detached, not cancelled, when the
/// timer wins. Its eventual result is dropped.
async fn race_timeout<P, Fut>(fetch: Fut, timeout: Duration) -> FetchResult<P>
where
    Fut: Future<Output = FetchResult<P>> + Send + 'static,
    P: Send + 'static,
{
    let handle = tokio::spawn(fetch);

    tokio::select! {
        joined = handle => match joined {
            Ok(result) => result,
            Err(e) => Err(FetchError::unexpected(format!("fetch task failed: {e}"))),
        },
        _ = tokio::time::sleep(timeout) => Err(FetchError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_race_returns_fetch_result_before_deadline() {
        let result = race_timeout(
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, FetchError>(7)
            },
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_times_out() {
        let result = race_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, FetchError>(7)
            },
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;
        assert_eq!(result, Err(FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_race_maps_panicked_task_to_unexpected() {
        let result: FetchResult<u8> = race_timeout(
            async {
                let value: u8 = "not a number".parse().unwrap();
                Ok(value)
            },
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(FetchError::Unexpected { .. })));
    }
}
