//! Dashboard state - one loading/error/data triple per source.

use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::metrics::{derive_overview, DashboardOverview};
use crate::recommendations::RecommendationStore;
use crate::source::SourceKind;
use crate::types::{CostAnalytics, Resource};

/// Where a source is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePhase {
    Loading,
    Ready,
    Failed,
}

/// Load state of one source.
///
/// While loading, the previous data stays visible. A failure clears the data
/// so stale values are never shown next to an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceState<T> {
    loading: bool,
    error: Option<FetchError>,
    data: T,
}

impl<T: Default> Default for SourceState<T> {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            data: T::default(),
        }
    }
}

impl<T: Default> SourceState<T> {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.data = data;
        self.error = None;
        self.loading = false;
    }

    pub(crate) fn fail(&mut self, error: FetchError) {
        self.data = T::default();
        self.error = Some(error);
        self.loading = false;
    }
}

impl<T> SourceState<T> {
    pub fn phase(&self) -> SourcePhase {
        if self.loading {
            SourcePhase::Loading
        } else if self.error.is_some() {
            SourcePhase::Failed
        } else {
            SourcePhase::Ready
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

/// One failed source, as shown in the error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub message: String,
}

/// Snapshot of everything the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub resources: SourceState<Vec<Resource>>,
    pub recommendations: SourceState<RecommendationStore>,
    pub analytics: SourceState<Option<CostAnalytics>>,
    /// Completion time of the most recent load cycle
    pub last_refresh: Option<DateTime<Utc>>,
    /// Busy flag for user-initiated refreshes
    pub refreshing: bool,
}

impl DashboardState {
    pub fn overview(&self) -> DashboardOverview {
        derive_overview(
            self.resources.data().len(),
            self.recommendations.data().summary(),
        )
    }

    /// Failed sources in display order.
    pub fn failures(&self) -> Vec<SourceFailure> {
        SourceKind::variants()
            .iter()
            .filter_map(|&source| {
                self.error_for(source).map(|error| SourceFailure {
                    source,
                    message: error.to_string(),
                })
            })
            .collect()
    }

    pub fn error_for(&self, source: SourceKind) -> Option<&FetchError> {
        match source {
            SourceKind::Resources => self.resources.error(),
            SourceKind::Recommendations => self.recommendations.error(),
            SourceKind::Analytics => self.analytics.error(),
        }
    }

    pub fn phase_of(&self, source: SourceKind) -> SourcePhase {
        match source {
            SourceKind::Resources => self.resources.phase(),
            SourceKind::Recommendations => self.recommendations.phase(),
            SourceKind::Analytics => self.analytics.phase(),
        }
    }

    pub fn has_any_error(&self) -> bool {
        SourceKind::variants()
            .iter()
            .any(|&source| self.error_for(source).is_some())
    }

    pub fn is_any_loading(&self) -> bool {
        SourceKind::variants()
            .iter()
            .any(|&source| self.phase_of(source) == SourcePhase::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_loading() {
        let state = DashboardState::default();
        assert!(state.is_any_loading());
        assert!(!state.has_any_error());
        assert!(state.last_refresh.is_none());
        assert_eq!(state.resources.phase(), SourcePhase::Loading);
    }

    #[test]
    fn test_begin_keeps_data_and_clears_error() {
        let mut source: SourceState<Vec<u32>> = SourceState::default();
        source.succeed(vec![1, 2]);
        source.fail(FetchError::Timeout);
        assert!(source.data().is_empty());

        source.succeed(vec![3]);
        source.begin();
        assert_eq!(source.phase(), SourcePhase::Loading);
        assert_eq!(source.data(), &vec![3]);
        assert!(source.error().is_none());
    }

    #[test]
    fn test_failures_listed_in_source_order() {
        let mut state = DashboardState::default();
        state.analytics.fail(FetchError::NotFound);
        state.resources.fail(FetchError::Timeout);
        state.recommendations.succeed(RecommendationStore::default());

        let failures = state.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].source, SourceKind::Resources);
        assert_eq!(failures[0].message, "Request timeout");
        assert_eq!(failures[1].source, SourceKind::Analytics);
        assert!(!state.is_any_loading());
    }
}
