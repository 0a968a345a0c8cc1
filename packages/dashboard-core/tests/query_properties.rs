//! Property tests for resource search, filtering and sorting.

use dashboard_core::query::compare_resources;
use dashboard_core::{Filter, Provider, Resource, ResourceQuery, ResourceType, SortDirection, SortField};
use proptest::prelude::*;

fn provider() -> impl Strategy<Value = Provider> {
    prop_oneof![
        Just(Provider::Aws),
        Just(Provider::Azure),
        Just(Provider::Gcp),
        Just(Provider::Other("oracle".into())),
    ]
}

fn resource_type() -> impl Strategy<Value = ResourceType> {
    prop_oneof![
        Just(ResourceType::Compute),
        Just(ResourceType::Storage),
        Just(ResourceType::Database),
        Just(ResourceType::Cache),
    ]
}

prop_compose! {
    fn resource()(
        id in 1i64..10_000,
        name in "[a-zA-Z]{1,8}(-[0-9]{1,2})?",
        kind in resource_type(),
        provider in provider(),
        instance in "(t3|m5|db\\.r5|B2s)\\.(small|large)",
        cpu in proptest::option::of(0.0f64..100.0),
        memory in proptest::option::of(0.0f64..100.0),
        cost in 0.0f64..5_000.0,
    ) -> Resource {
        let mut resource = Resource::new(id, name, kind, provider, instance, cost);
        resource.cpu_utilization = cpu;
        resource.memory_utilization = memory;
        resource
    }
}

fn sort_field() -> impl Strategy<Value = SortField> {
    proptest::sample::select(SortField::variants().to_vec())
}

fn direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

prop_compose! {
    fn query()(
        search in prop_oneof![Just(String::new()), "[a-z]{1,3}"],
        provider in proptest::option::of(provider()),
        kind in proptest::option::of(resource_type()),
        field in sort_field(),
        direction in direction(),
    ) -> ResourceQuery {
        ResourceQuery::new()
            .with_search(search)
            .with_provider(provider.map_or(Filter::All, Filter::Only))
            .with_type(kind.map_or(Filter::All, Filter::Only))
            .sorted_by(field, direction)
    }
}

proptest! {
    #[test]
    fn view_is_a_matching_subset(
        resources in proptest::collection::vec(resource(), 0..40),
        query in query(),
    ) {
        let view = query.apply(&resources);
        prop_assert!(view.len() <= resources.len());
        for shown in &view {
            prop_assert!(resources.contains(shown));
            prop_assert!(query.matches(shown));
        }
        let expected = resources.iter().filter(|r| query.matches(r)).count();
        prop_assert_eq!(view.len(), expected);
    }

    #[test]
    fn apply_is_idempotent(
        resources in proptest::collection::vec(resource(), 0..40),
        query in query(),
    ) {
        let once = query.apply(&resources);
        let twice = query.apply(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn view_is_ordered_and_missing_values_trail(
        resources in proptest::collection::vec(resource(), 0..40),
        field in sort_field(),
        direction in direction(),
    ) {
        let query = ResourceQuery::new().sorted_by(field, direction);
        let view = query.apply(&resources);

        for pair in view.windows(2) {
            prop_assert_ne!(
                compare_resources(&pair[0], &pair[1], field, direction),
                std::cmp::Ordering::Greater
            );
        }

        if field == SortField::CpuUtilization {
            let first_missing = view.iter().position(|r| r.cpu_utilization.is_none());
            if let Some(index) = first_missing {
                prop_assert!(view[index..].iter().all(|r| r.cpu_utilization.is_none()));
            }
        }
    }

    #[test]
    fn empty_search_with_no_filters_keeps_everything(
        resources in proptest::collection::vec(resource(), 0..40),
    ) {
        let view = ResourceQuery::new().apply(&resources);
        prop_assert_eq!(view.len(), resources.len());
    }
}
