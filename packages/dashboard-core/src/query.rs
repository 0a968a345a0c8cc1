//! Resource query - search, filter and sort parameters for the resource table
//!
//! `ResourceQuery::apply` never mutates its input; it returns a new, ordered
//! view containing a subset of the given resources.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use icu_collator::{Collator, CollatorOptions};

use crate::types::{Provider, Resource, ResourceType};

// ============================================================================
// Filters
// ============================================================================

/// A filter dimension that either accepts everything or one value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T: From<String>> Filter<T> {
    /// Parse a select-box value where `all` means no filtering.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("all") {
            Filter::All
        } else {
            Filter::Only(T::from(raw.to_string()))
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Any resource attribute the table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    Id,
    Name,
    ResourceType,
    Provider,
    InstanceType,
    Size,
    CpuUtilization,
    MemoryUtilization,
    StorageUsage,
    #[default]
    MonthlyCost,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::ResourceType => "resource_type",
            SortField::Provider => "provider",
            SortField::InstanceType => "instance_type",
            SortField::Size => "size",
            SortField::CpuUtilization => "cpu_utilization",
            SortField::MemoryUtilization => "memory_utilization",
            SortField::StorageUsage => "storage_usage",
            SortField::MonthlyCost => "monthly_cost",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    pub fn variants() -> &'static [SortField] {
        &[
            SortField::Id,
            SortField::Name,
            SortField::ResourceType,
            SortField::Provider,
            SortField::InstanceType,
            SortField::Size,
            SortField::CpuUtilization,
            SortField::MemoryUtilization,
            SortField::StorageUsage,
            SortField::MonthlyCost,
            SortField::CreatedAt,
            SortField::UpdatedAt,
        ]
    }

    fn key<'a>(&self, resource: &'a Resource) -> SortKey<'a> {
        match self {
            SortField::Id => SortKey::Number(resource.id as f64),
            SortField::Name => SortKey::Text(&resource.name),
            SortField::ResourceType => SortKey::Text(resource.resource_type.as_str()),
            SortField::Provider => SortKey::Text(resource.provider.as_str()),
            SortField::InstanceType => SortKey::Text(&resource.instance_type),
            SortField::Size => resource.size.as_deref().map_or(SortKey::Missing, SortKey::Text),
            SortField::CpuUtilization => SortKey::number(resource.cpu_utilization),
            SortField::MemoryUtilization => SortKey::number(resource.memory_utilization),
            SortField::StorageUsage => SortKey::number(resource.storage_usage),
            SortField::MonthlyCost => SortKey::Number(resource.monthly_cost),
            SortField::CreatedAt => SortKey::Time(resource.created_at),
            SortField::UpdatedAt => resource.updated_at.map_or(SortKey::Missing, SortKey::Time),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortField(pub String);

impl fmt::Display for UnknownSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort field: {}", self.0)
    }
}

impl std::error::Error for UnknownSortField {}

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        SortField::variants()
            .iter()
            .copied()
            .find(|field| field.as_str() == raw)
            .ok_or_else(|| UnknownSortField(raw.to_string()))
    }
}

enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
    Time(DateTime<Utc>),
    Missing,
}

impl SortKey<'_> {
    fn number(value: Option<f64>) -> Self {
        value.map_or(SortKey::Missing, SortKey::Number)
    }

    /// Ascending comparison of two present keys of the same field.
    fn cmp_present(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => locale_cmp(a, b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

thread_local! {
    // Root collation, which is also the English ordering.
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Human ordering for display strings, following the default Unicode
/// collation where accents and case only break ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => case_folded_cmp(a, b),
    })
}

fn case_folded_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

/// Compare two resources on `field`. Absent values sort last in both
/// directions.
pub fn compare_resources(
    a: &Resource,
    b: &Resource,
    field: SortField,
    direction: SortDirection,
) -> Ordering {
    match (field.key(a), field.key(b)) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => Ordering::Greater,
        (_, SortKey::Missing) => Ordering::Less,
        (ka, kb) => {
            let ordering = ka.cmp_present(&kb);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Committed search/filter/sort parameters for the resource table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceQuery {
    pub search: String,
    pub provider: Filter<Provider>,
    pub resource_type: Filter<ResourceType>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ResourceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_provider(mut self, provider: Filter<Provider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_type(mut self, resource_type: Filter<ResourceType>) -> Self {
        self.resource_type = resource_type;
        self
    }

    pub fn sorted_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = field;
        self.sort_direction = direction;
        self
    }

    /// Selecting the active field flips direction; a new field starts `desc`.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Desc;
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        self.matches_search(resource)
            && self.provider.matches(&resource.provider)
            && self.resource_type.matches(&resource.resource_type)
    }

    fn matches_search(&self, resource: &Resource) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        resource.name.to_lowercase().contains(&term)
            || resource.instance_type.to_lowercase().contains(&term)
    }

    /// Filtered and ordered copy of `resources`. The sort is stable, so equal
    /// keys keep their input order.
    pub fn apply(&self, resources: &[Resource]) -> Vec<Resource> {
        let mut view: Vec<Resource> = resources
            .iter()
            .filter(|resource| self.matches(resource))
            .cloned()
            .collect();
        view.sort_by(|a, b| compare_resources(a, b, self.sort_field, self.sort_direction));
        view
    }
}
