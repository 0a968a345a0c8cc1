//! Session-local recommendation state
//!
//! The latest optimization summary plus any "implemented" toggles the user
//! made since it was loaded. Toggles are never sent to the service; the next
//! successful load replaces the whole store.

use tracing::debug;

use crate::metrics::{savings_breakdown, SavingsBreakdown};
use crate::types::{OptimizationSummary, Recommendation};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationStore {
    summary: Option<OptimizationSummary>,
}

impl RecommendationStore {
    pub fn new(summary: OptimizationSummary) -> Self {
        Self {
            summary: Some(summary),
        }
    }

    pub fn replace(&mut self, summary: OptimizationSummary) {
        self.summary = Some(summary);
    }

    pub fn summary(&self) -> Option<&OptimizationSummary> {
        self.summary.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.summary.is_some()
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        self.summary
            .as_ref()
            .map(|s| s.recommendations.as_slice())
            .unwrap_or_default()
    }

    /// Mark every recommendation for `resource_id` as (not) implemented.
    ///
    /// Returns how many recommendations matched. Unknown ids and an empty
    /// store are no-ops.
    pub fn set_implemented(&mut self, resource_id: i64, implemented: bool) -> usize {
        let Some(summary) = self.summary.as_mut() else {
            return 0;
        };

        let mut matched = 0;
        for rec in summary
            .recommendations
            .iter_mut()
            .filter(|rec| rec.resource_id == resource_id)
        {
            rec.implemented = implemented;
            matched += 1;
        }

        debug!(resource_id, implemented, matched, "Updated recommendation state");
        matched
    }

    pub fn savings(&self) -> SavingsBreakdown {
        savings_breakdown(self.recommendations())
    }
}

impl From<OptimizationSummary> for RecommendationStore {
    fn from(summary: OptimizationSummary) -> Self {
        Self::new(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> OptimizationSummary {
        OptimizationSummary {
            total_resources: 3,
            total_monthly_cost: 1000.0,
            total_potential_savings: 350.0,
            recommendations: vec![
                Recommendation::new(1, "web-1", "downsize", 100.0),
                Recommendation::new(2, "db-main", "rightsize", 200.0),
                Recommendation::new(1, "web-1", "reserved_instance", 50.0),
            ],
            savings_percentage: 35.0,
        }
    }

    #[test]
    fn test_toggle_updates_every_match() {
        let mut store = RecommendationStore::new(summary());
        assert_eq!(store.set_implemented(1, true), 2);

        let savings = store.savings();
        assert_eq!(savings.implemented_savings, 150.0);
        assert_eq!(savings.pending_savings, 200.0);
        assert_eq!(savings.pending_count, 1);
    }

    #[test]
    fn test_toggle_back_restores_pending() {
        let mut store = RecommendationStore::new(summary());
        store.set_implemented(2, true);
        store.set_implemented(2, false);
        assert_eq!(store.savings().pending_savings, 350.0);
        assert_eq!(store.savings().implemented_count, 0);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = RecommendationStore::new(summary());
        assert_eq!(store.set_implemented(99, true), 0);
        assert_eq!(store, RecommendationStore::new(summary()));
    }

    #[test]
    fn test_empty_store_is_noop() {
        let mut store = RecommendationStore::default();
        assert_eq!(store.set_implemented(1, true), 0);
        assert!(store.recommendations().is_empty());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_replace_discards_toggles() {
        let mut store = RecommendationStore::new(summary());
        store.set_implemented(1, true);
        store.replace(summary());
        assert!(store.recommendations().iter().all(|r| !r.implemented));
    }
}
