//! Type definitions for optimization service responses
//!
//! Field names match the service's JSON contract (snake_case). Enumerations
//! keep unrecognised values in an `Other` variant so display fallbacks stay
//! reachable instead of failing the whole payload.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enumerations
// ============================================================================

/// Cloud provider hosting a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
            Provider::Other(raw) => raw,
        }
    }

    pub fn variants() -> &'static [Provider] {
        &[Provider::Aws, Provider::Azure, Provider::Gcp]
    }
}

impl From<String> for Provider {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "aws" => Provider::Aws,
            "azure" => Provider::Azure,
            "gcp" => Provider::Gcp,
            _ => Provider::Other(raw),
        }
    }
}

impl From<&str> for Provider {
    fn from(raw: &str) -> Self {
        Provider::from(raw.to_string())
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of cloud resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Compute,
    Storage,
    Database,
    Cache,
    Other(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Compute => "compute",
            ResourceType::Storage => "storage",
            ResourceType::Database => "database",
            ResourceType::Cache => "cache",
            ResourceType::Other(raw) => raw,
        }
    }

    pub fn variants() -> &'static [ResourceType] {
        &[
            ResourceType::Compute,
            ResourceType::Storage,
            ResourceType::Database,
            ResourceType::Cache,
        ]
    }
}

impl From<String> for ResourceType {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "compute" => ResourceType::Compute,
            "storage" => ResourceType::Storage,
            "database" => ResourceType::Database,
            "cache" => ResourceType::Cache,
            _ => ResourceType::Other(raw),
        }
    }
}

impl From<&str> for ResourceType {
    fn from(raw: &str) -> Self {
        ResourceType::from(raw.to_string())
    }
}

impl From<ResourceType> for String {
    fn from(kind: ResourceType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certainty the service attaches to a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Other(String),
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Other(raw) => raw,
        }
    }
}

impl From<String> for ConfidenceLevel {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "high" => ConfidenceLevel::High,
            "medium" => ConfidenceLevel::Medium,
            "low" => ConfidenceLevel::Low,
            _ => ConfidenceLevel::Other(raw),
        }
    }
}

impl From<&str> for ConfidenceLevel {
    fn from(raw: &str) -> Self {
        ConfidenceLevel::from(raw.to_string())
    }
}

impl From<ConfidenceLevel> for String {
    fn from(level: ConfidenceLevel) -> Self {
        level.as_str().to_string()
    }
}

// ============================================================================
// Resource Types
// ============================================================================

/// A cloud resource with its utilization and cost data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub resource_type: ResourceType,
    pub provider: Provider,
    pub instance_type: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub cpu_utilization: Option<f64>,
    #[serde(default)]
    pub memory_utilization: Option<f64>,
    /// Storage usage in GB
    #[serde(default)]
    pub storage_usage: Option<f64>,
    pub monthly_cost: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Create a resource with required fields; optional metrics start absent.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        resource_type: ResourceType,
        provider: Provider,
        instance_type: impl Into<String>,
        monthly_cost: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            resource_type,
            provider,
            instance_type: instance_type.into(),
            size: None,
            cpu_utilization: None,
            memory_utilization: None,
            storage_usage: None,
            monthly_cost,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn with_utilization(mut self, cpu: f64, memory: f64) -> Self {
        self.cpu_utilization = Some(cpu);
        self.memory_utilization = Some(memory);
        self
    }

    pub fn with_storage_usage(mut self, gb: f64) -> Self {
        self.storage_usage = Some(gb);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// CPU and memory utilization, only when both are reported.
    pub fn utilization(&self) -> Option<(f64, f64)> {
        self.cpu_utilization.zip(self.memory_utilization)
    }
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// A cost-saving recommendation for one resource.
///
/// `resource_id` and `resource_name` are snapshots taken by the service and
/// are not validated against the live resource collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub resource_id: i64,
    pub resource_name: String,
    pub current_cost: f64,
    pub recommendation_type: String,
    pub description: String,
    pub recommended_action: String,
    pub estimated_savings: f64,
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub implemented: bool,
}

impl Recommendation {
    pub fn new(
        resource_id: i64,
        resource_name: impl Into<String>,
        recommendation_type: impl Into<String>,
        estimated_savings: f64,
    ) -> Self {
        Self {
            resource_id,
            resource_name: resource_name.into(),
            current_cost: 0.0,
            recommendation_type: recommendation_type.into(),
            description: String::new(),
            recommended_action: String::new(),
            estimated_savings,
            confidence_level: ConfidenceLevel::Medium,
            implemented: false,
        }
    }

    pub fn with_current_cost(mut self, cost: f64) -> Self {
        self.current_cost = cost;
        self
    }

    pub fn with_confidence(mut self, level: ConfidenceLevel) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn implemented(mut self, implemented: bool) -> Self {
        self.implemented = implemented;
        self
    }
}

/// Recommendations plus the totals the service computed for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub total_resources: u64,
    pub total_monthly_cost: f64,
    pub total_potential_savings: f64,
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub savings_percentage: f64,
}

// ============================================================================
// Analytics Types
// ============================================================================

/// Count and cost for one group of resources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBucket {
    pub count: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationPotential {
    pub potential_savings: f64,
    pub savings_percentage: f64,
    pub recommendations_count: u64,
}

/// Cost breakdown served by the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalytics {
    pub total_monthly_cost: f64,
    pub total_resources: u64,
    #[serde(default)]
    pub cost_by_type: BTreeMap<String, CostBucket>,
    #[serde(default)]
    pub cost_by_provider: BTreeMap<String, CostBucket>,
    pub optimization_potential: OptimizationPotential,
}

// ============================================================================
// Health Types
// ============================================================================

/// Liveness payload of the optimization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// Per-resource health score as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceHealth {
    pub resource_id: i64,
    pub resource_name: String,
    pub health_score: u32,
    pub status: String,
    #[serde(default)]
    pub issues: Vec<String>,
    pub monthly_cost: f64,
}

// ============================================================================
// Timestamp encoding
// ============================================================================

/// Timestamps arrive either RFC 3339 or as naive ISO-8601 (treated as UTC).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => s.serialize_some(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
                None => Ok(None),
            }
        }
    }
}
