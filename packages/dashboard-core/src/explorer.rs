//! Interactive resource table
//!
//! Holds the resource snapshot plus the committed query and keeps the
//! filtered, sorted view in sync. Search input is debounced; filter and sort
//! changes apply immediately. The view is only recomputed when the resource
//! set or the committed query actually changes.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::debug;

use crate::debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE};
use crate::query::{Filter, ResourceQuery, SortField};
use crate::types::{Provider, Resource, ResourceType};

#[derive(Debug, Default)]
struct ExplorerState {
    resources: Vec<Resource>,
    query: ResourceQuery,
    view: Vec<Resource>,
    recomputations: u64,
}

impl ExplorerState {
    fn recompute(&mut self) {
        self.view = self.query.apply(&self.resources);
        self.recomputations += 1;
        debug!(
            shown = self.view.len(),
            total = self.resources.len(),
            sort = %self.query.sort_field,
            direction = self.query.sort_direction.as_str(),
            "Recomputed resource view"
        );
    }

    /// Apply a query change, recomputing only if the query differs.
    fn update_query(&mut self, change: impl FnOnce(&mut ResourceQuery)) {
        let before = self.query.clone();
        change(&mut self.query);
        if self.query != before {
            self.recompute();
        }
    }
}

/// "N of M resources" counts for the table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCounts {
    pub shown: usize,
    pub total: usize,
}

/// Search, filter and sort over a resource snapshot.
///
/// Must be created inside a tokio runtime because search input is debounced
/// on a background task.
pub struct ResourceExplorer {
    state: Arc<RwLock<ExplorerState>>,
    search: Debouncer<String>,
}

impl ResourceExplorer {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self::with_debounce(resources, DEFAULT_SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(resources: Vec<Resource>, window: Duration) -> Self {
        let query = ResourceQuery::default();
        let view = query.apply(&resources);
        let state = Arc::new(RwLock::new(ExplorerState {
            resources,
            query,
            view,
            recomputations: 0,
        }));

        let committed = Arc::clone(&state);
        let search = Debouncer::new(window, move |term: String| {
            let mut state = committed.write().unwrap_or_else(PoisonError::into_inner);
            debug!(term = %term, "Committing search term");
            state.update_query(|query| query.search = term);
        });

        Self { state, search }
    }

    /// Feed one raw keystroke-level value of the search box.
    pub fn input_search(&self, raw: impl Into<String>) {
        self.search.push(raw.into());
    }

    pub fn set_provider_filter(&self, provider: Filter<Provider>) {
        self.write().update_query(|query| query.provider = provider);
    }

    pub fn set_type_filter(&self, resource_type: Filter<ResourceType>) {
        self.write()
            .update_query(|query| query.resource_type = resource_type);
    }

    pub fn toggle_sort(&self, field: SortField) {
        self.write().update_query(|query| query.toggle_sort(field));
    }

    /// Replace the resource snapshot, e.g. after a refresh.
    pub fn set_resources(&self, resources: Vec<Resource>) {
        let mut state = self.write();
        state.resources = resources;
        state.recompute();
    }

    pub fn view(&self) -> Vec<Resource> {
        self.read().view.clone()
    }

    /// The committed query. Search text still inside the debounce window is
    /// not reflected here.
    pub fn query(&self) -> ResourceQuery {
        self.read().query.clone()
    }

    pub fn counts(&self) -> ViewCounts {
        let state = self.read();
        ViewCounts {
            shown: state.view.len(),
            total: state.resources.len(),
        }
    }

    /// Number of view recomputations since construction.
    pub fn recomputations(&self) -> u64 {
        self.read().recomputations
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ExplorerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ExplorerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;

    fn fleet() -> Vec<Resource> {
        vec![
            Resource::new(1, "web-1", ResourceType::Compute, Provider::Aws, "t3.large", 120.0),
            Resource::new(2, "db-main", ResourceType::Database, Provider::Gcp, "db-n1", 300.0),
            Resource::new(3, "web-2", ResourceType::Compute, Provider::Azure, "B2s", 80.0),
        ]
    }

    fn ids(view: &[Resource]) -> Vec<i64> {
        view.iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_initial_view_sorted_by_cost_desc() {
        let explorer = ResourceExplorer::new(fleet());
        assert_eq!(ids(&explorer.view()), vec![2, 1, 3]);
        assert_eq!(explorer.recomputations(), 0);
        assert_eq!(explorer.counts(), ViewCounts { shown: 3, total: 3 });
    }

    #[tokio::test]
    async fn test_filters_apply_immediately() {
        let explorer = ResourceExplorer::new(fleet());
        explorer.set_type_filter(Filter::Only(ResourceType::Compute));
        assert_eq!(ids(&explorer.view()), vec![1, 3]);
        assert_eq!(explorer.counts(), ViewCounts { shown: 2, total: 3 });

        explorer.set_provider_filter(Filter::Only(Provider::Azure));
        assert_eq!(ids(&explorer.view()), vec![3]);
        assert_eq!(explorer.recomputations(), 2);
    }

    #[tokio::test]
    async fn test_unchanged_query_does_not_recompute() {
        let explorer = ResourceExplorer::new(fleet());
        explorer.set_provider_filter(Filter::All);
        assert_eq!(explorer.recomputations(), 0);
    }

    #[tokio::test]
    async fn test_toggle_sort_reorders_view() {
        let explorer = ResourceExplorer::new(fleet());
        explorer.toggle_sort(SortField::MonthlyCost);
        assert_eq!(explorer.query().sort_direction, SortDirection::Asc);
        assert_eq!(ids(&explorer.view()), vec![3, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_commits_after_idle_window() {
        let explorer = ResourceExplorer::new(fleet());
        explorer.input_search("w");
        explorer.input_search("we");
        explorer.input_search("web");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(explorer.query().search, "");
        assert_eq!(explorer.view().len(), 3);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(explorer.query().search, "web");
        assert_eq!(ids(&explorer.view()), vec![1, 3]);
        assert_eq!(explorer.recomputations(), 1);
    }

    #[tokio::test]
    async fn test_set_resources_recomputes_with_current_query() {
        let explorer = ResourceExplorer::new(fleet());
        explorer.set_provider_filter(Filter::Only(Provider::Gcp));
        explorer.set_resources(vec![Resource::new(
            9,
            "analytics",
            ResourceType::Database,
            Provider::Gcp,
            "db-n2",
            10.0,
        )]);
        assert_eq!(ids(&explorer.view()), vec![9]);
        assert_eq!(explorer.counts(), ViewCounts { shown: 1, total: 1 });
    }
}
