//! Derived metrics - pure classifications, lookups and aggregates
//!
//! Nothing in this module performs I/O or keeps state between calls.
//! Aggregates are recomputed from the records on every call so they always
//! agree with the latest `implemented` flags.

use std::collections::BTreeMap;

use crate::types::{
    ConfidenceLevel, OptimizationSummary, Provider, Recommendation, Resource, ResourceType,
};

// ============================================================================
// Formatting
// ============================================================================

/// Format an amount as US dollars with thousands separators and up to two
/// fraction digits (`1234.5` -> `$1,234.5`, `100` -> `$100`).
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let fraction = if fraction == 0 {
        String::new()
    } else if fraction % 10 == 0 {
        format!(".{}", fraction / 10)
    } else {
        format!(".{:02}", fraction)
    };

    format!("{}${}{}", sign, group_thousands(whole), fraction)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a percentage with exactly one decimal place.
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

// ============================================================================
// Display lookups
// ============================================================================

/// Colour family used when presenting a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Gray,
    Orange,
    Amber,
    Yellow,
    Blue,
    Green,
    Purple,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub tone: Tone,
}

pub fn provider_info(provider: &Provider) -> ProviderInfo {
    let (name, tone) = match provider {
        Provider::Aws => ("AWS".to_string(), Tone::Orange),
        Provider::Azure => ("Azure".to_string(), Tone::Blue),
        Provider::Gcp => ("GCP".to_string(), Tone::Green),
        Provider::Other(raw) => (raw.to_uppercase(), Tone::Gray),
    };
    ProviderInfo { name, tone }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeInfo {
    pub name: String,
    pub icon: &'static str,
    pub tone: Tone,
}

pub fn resource_type_info(kind: &ResourceType) -> ResourceTypeInfo {
    let (name, icon, tone) = match kind {
        ResourceType::Compute => ("Compute".to_string(), "\u{1F5A5}\u{FE0F}", Tone::Blue), // 🖥️
        ResourceType::Storage => ("Storage".to_string(), "\u{1F4BE}", Tone::Purple), // 💾
        ResourceType::Database => ("Database".to_string(), "\u{1F5C3}\u{FE0F}", Tone::Green), // 🗃️
        ResourceType::Cache => ("Cache".to_string(), "\u{26A1}", Tone::Yellow), // ⚡
        ResourceType::Other(raw) => (raw.clone(), "\u{1F4E6}", Tone::Gray), // 📦
    };
    ResourceTypeInfo { name, icon, tone }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceStyle {
    pub text: &'static str,
    pub tone: Tone,
}

pub fn confidence_style(level: &ConfidenceLevel) -> ConfidenceStyle {
    match level {
        ConfidenceLevel::High => ConfidenceStyle {
            text: "High Confidence",
            tone: Tone::Green,
        },
        ConfidenceLevel::Medium => ConfidenceStyle {
            text: "Medium Confidence",
            tone: Tone::Amber,
        },
        ConfidenceLevel::Low => ConfidenceStyle {
            text: "Low Confidence",
            tone: Tone::Red,
        },
        ConfidenceLevel::Other(_) => ConfidenceStyle {
            text: "Unknown",
            tone: Tone::Gray,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationStyle {
    pub icon: &'static str,
    pub tone: Tone,
}

/// Style for a free-form recommendation type; unknown types get the default.
pub fn recommendation_type_style(recommendation_type: &str) -> RecommendationStyle {
    match recommendation_type.to_lowercase().as_str() {
        "downsize" => RecommendationStyle {
            icon: "\u{2193}", // ↓
            tone: Tone::Blue,
        },
        "storage_optimization" => RecommendationStyle {
            icon: "\u{1F4BE}", // 💾
            tone: Tone::Purple,
        },
        "terminate" => RecommendationStyle {
            icon: "\u{1F5D1}\u{FE0F}", // 🗑️
            tone: Tone::Red,
        },
        _ => RecommendationStyle {
            icon: "\u{1F4A1}", // 💡
            tone: Tone::Gray,
        },
    }
}

// ============================================================================
// Utilization classification
// ============================================================================

/// Provisioning adequacy derived from CPU and memory utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilizationStatus {
    OverProvisioned,
    WellUtilized,
    UnderProvisioned,
    Unknown,
}

impl UtilizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UtilizationStatus::OverProvisioned => "over-provisioned",
            UtilizationStatus::WellUtilized => "well-utilized",
            UtilizationStatus::UnderProvisioned => "under-provisioned",
            UtilizationStatus::Unknown => "unknown",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            UtilizationStatus::OverProvisioned => Tone::Amber,
            UtilizationStatus::WellUtilized => Tone::Green,
            UtilizationStatus::UnderProvisioned => Tone::Red,
            UtilizationStatus::Unknown => Tone::Gray,
        }
    }
}

/// Classify a resource. Thresholds are strict: values sitting exactly on a
/// threshold count as well-utilized.
pub fn classify(resource: &Resource) -> UtilizationStatus {
    let Some((cpu, memory)) = resource.utilization() else {
        return UtilizationStatus::Unknown;
    };

    if cpu < 30.0 && memory < 50.0 {
        UtilizationStatus::OverProvisioned
    } else if cpu > 80.0 || memory > 85.0 {
        UtilizationStatus::UnderProvisioned
    } else {
        UtilizationStatus::WellUtilized
    }
}

// ============================================================================
// Health score
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Optimal,
    OverProvisioned,
    UnderProvisioned,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Optimal => "optimal",
            HealthStatus::OverProvisioned => "over-provisioned",
            HealthStatus::UnderProvisioned => "under-provisioned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthAssessment {
    pub score: u32,
    pub status: HealthStatus,
    pub issues: Vec<String>,
}

/// Score a resource's health from its utilization, mirroring the service's
/// per-resource health endpoint so it can be shown without a round trip.
///
/// Like the service, a utilization of exactly zero counts as unreported here,
/// unlike [`classify`].
pub fn health_score(resource: &Resource) -> HealthAssessment {
    let mut penalty = 0u32;
    let mut status = HealthStatus::Optimal;
    let mut issues = Vec::new();

    let reported = |value: Option<f64>| value.filter(|v| *v != 0.0);

    if let Some(cpu) = reported(resource.cpu_utilization) {
        if cpu < 20.0 {
            penalty += 30;
            issues.push("Low CPU utilization".to_string());
            status = HealthStatus::OverProvisioned;
        } else if cpu > 80.0 {
            penalty += 20;
            issues.push("High CPU utilization".to_string());
            status = HealthStatus::UnderProvisioned;
        }
    }

    if let Some(memory) = reported(resource.memory_utilization) {
        if memory < 30.0 {
            penalty += 25;
            issues.push("Low memory utilization".to_string());
            if status != HealthStatus::UnderProvisioned {
                status = HealthStatus::OverProvisioned;
            }
        } else if memory > 85.0 {
            penalty += 15;
            issues.push("High memory utilization".to_string());
            status = HealthStatus::UnderProvisioned;
        }
    }

    HealthAssessment {
        score: 100u32.saturating_sub(penalty),
        status,
        issues,
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Savings split by implementation state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavingsBreakdown {
    pub pending_savings: f64,
    pub implemented_savings: f64,
    pub pending_count: usize,
    pub implemented_count: usize,
}

pub fn savings_breakdown(recommendations: &[Recommendation]) -> SavingsBreakdown {
    recommendations
        .iter()
        .fold(SavingsBreakdown::default(), |mut acc, rec| {
            if rec.implemented {
                acc.implemented_savings += rec.estimated_savings;
                acc.implemented_count += 1;
            } else {
                acc.pending_savings += rec.estimated_savings;
                acc.pending_count += 1;
            }
            acc
        })
}

pub fn pending_savings(recommendations: &[Recommendation]) -> f64 {
    savings_breakdown(recommendations).pending_savings
}

pub fn implemented_savings(recommendations: &[Recommendation]) -> f64 {
    savings_breakdown(recommendations).implemented_savings
}

/// `potential / total * 100`, defined as exactly `0` when there is no cost.
pub fn savings_percentage(total_potential_savings: f64, total_monthly_cost: f64) -> f64 {
    if total_monthly_cost > 0.0 {
        total_potential_savings / total_monthly_cost * 100.0
    } else {
        0.0
    }
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardOverview {
    pub total_resources: usize,
    pub total_monthly_cost: f64,
    pub total_potential_savings: f64,
    pub optimized_cost: f64,
    pub savings_percentage: f64,
    pub optimization_opportunities: usize,
    pub pending_savings: f64,
    pub implemented_savings: f64,
}

/// Derive the overview from the live resource count and the latest summary.
/// A missing summary (not loaded or failed) yields zeroed cost figures.
pub fn derive_overview(
    resource_count: usize,
    summary: Option<&OptimizationSummary>,
) -> DashboardOverview {
    let Some(summary) = summary else {
        return DashboardOverview {
            total_resources: resource_count,
            ..Default::default()
        };
    };

    let breakdown = savings_breakdown(&summary.recommendations);

    DashboardOverview {
        total_resources: resource_count,
        total_monthly_cost: summary.total_monthly_cost,
        total_potential_savings: summary.total_potential_savings,
        optimized_cost: summary.total_monthly_cost - summary.total_potential_savings,
        savings_percentage: savings_percentage(
            summary.total_potential_savings,
            summary.total_monthly_cost,
        ),
        optimization_opportunities: breakdown.pending_count,
        pending_savings: breakdown.pending_savings,
        implemented_savings: breakdown.implemented_savings,
    }
}

// ============================================================================
// Grouping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceGroup {
    pub resources: Vec<Resource>,
    pub count: usize,
    pub total_cost: f64,
}

impl ResourceGroup {
    fn push(&mut self, resource: &Resource) {
        self.total_cost += resource.monthly_cost;
        self.count += 1;
        self.resources.push(resource.clone());
    }
}

/// Group resources by their type name, preserving input order within groups.
pub fn group_by_type(resources: &[Resource]) -> BTreeMap<String, ResourceGroup> {
    group_by(resources, |r| r.resource_type.as_str().to_string())
}

/// Group resources by provider name, preserving input order within groups.
pub fn group_by_provider(resources: &[Resource]) -> BTreeMap<String, ResourceGroup> {
    group_by(resources, |r| r.provider.as_str().to_string())
}

fn group_by<F>(resources: &[Resource], key: F) -> BTreeMap<String, ResourceGroup>
where
    F: Fn(&Resource) -> String,
{
    let mut groups: BTreeMap<String, ResourceGroup> = BTreeMap::new();
    for resource in resources {
        groups.entry(key(resource)).or_default().push(resource);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Provider, ResourceType};

    fn vm(cpu: Option<f64>, memory: Option<f64>) -> Resource {
        let mut r = Resource::new(1, "vm", ResourceType::Compute, Provider::Aws, "t3.large", 80.0);
        r.cpu_utilization = cpu;
        r.memory_utilization = memory;
        r
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(100.0), "$100");
        assert_eq!(format_currency(1234.5), "$1,234.5");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.125), "$0.13");
        assert_eq!(format_currency(-42.25), "-$42.25");
        assert_eq!(format_currency(-0.001), "$0");
    }

    #[test]
    fn test_format_percentage_one_decimal() {
        assert_eq!(format_percentage(0.0), "0.0%");
        assert_eq!(format_percentage(33.333), "33.3%");
        assert_eq!(format_percentage(12.96), "13.0%");
    }

    #[test]
    fn test_classify_branches() {
        assert_eq!(classify(&vm(Some(10.0), Some(20.0))), UtilizationStatus::OverProvisioned);
        assert_eq!(classify(&vm(Some(90.0), Some(40.0))), UtilizationStatus::UnderProvisioned);
        assert_eq!(classify(&vm(Some(50.0), Some(90.0))), UtilizationStatus::UnderProvisioned);
        assert_eq!(classify(&vm(Some(50.0), Some(60.0))), UtilizationStatus::WellUtilized);
    }

    #[test]
    fn test_classify_boundaries_are_well_utilized() {
        assert_eq!(classify(&vm(Some(30.0), Some(50.0))), UtilizationStatus::WellUtilized);
        assert_eq!(classify(&vm(Some(80.0), Some(85.0))), UtilizationStatus::WellUtilized);
        // Only one strict inequality satisfied on each side
        assert_eq!(classify(&vm(Some(29.9), Some(50.0))), UtilizationStatus::WellUtilized);
        assert_eq!(classify(&vm(Some(80.0), Some(85.1))), UtilizationStatus::UnderProvisioned);
    }

    #[test]
    fn test_classify_missing_metric_is_unknown() {
        assert_eq!(classify(&vm(None, Some(20.0))), UtilizationStatus::Unknown);
        assert_eq!(classify(&vm(Some(10.0), None)), UtilizationStatus::Unknown);
        assert_eq!(classify(&vm(None, None)), UtilizationStatus::Unknown);
        // Zero is a reported value, not an absent one
        assert_eq!(classify(&vm(Some(0.0), Some(0.0))), UtilizationStatus::OverProvisioned);
    }

    #[test]
    fn test_lookup_fallbacks() {
        let oracle = provider_info(&Provider::Other("oracle".into()));
        assert_eq!(oracle.name, "ORACLE");
        assert_eq!(oracle.tone, Tone::Gray);
        assert_eq!(provider_info(&Provider::Gcp).name, "GCP");

        let queue = resource_type_info(&ResourceType::Other("queue".into()));
        assert_eq!(queue.name, "queue");
        assert_eq!(resource_type_info(&ResourceType::Cache).name, "Cache");

        assert_eq!(confidence_style(&ConfidenceLevel::Other("?".into())).text, "Unknown");
        assert_eq!(confidence_style(&ConfidenceLevel::High).text, "High Confidence");

        assert_eq!(recommendation_type_style("Terminate").tone, Tone::Red);
        assert_eq!(recommendation_type_style("rightsizing").icon, "\u{1F4A1}");
    }

    #[test]
    fn test_savings_split_by_implemented() {
        let recs = vec![
            Recommendation::new(1, "a", "downsize", 20.0),
            Recommendation::new(2, "b", "terminate", 10.0).implemented(true),
        ];
        let breakdown = savings_breakdown(&recs);
        assert_eq!(breakdown.pending_savings, 20.0);
        assert_eq!(breakdown.implemented_savings, 10.0);
        assert_eq!(breakdown.pending_count, 1);
        assert_eq!(pending_savings(&recs), 20.0);
        assert_eq!(implemented_savings(&recs), 10.0);
    }

    #[test]
    fn test_savings_percentage_zero_cost() {
        assert_eq!(savings_percentage(0.0, 0.0), 0.0);
        assert_eq!(savings_percentage(500.0, 0.0), 0.0);
        assert_eq!(savings_percentage(25.0, 200.0), 12.5);
    }

    #[test]
    fn test_derive_overview() {
        let summary = OptimizationSummary {
            total_resources: 2,
            total_monthly_cost: 400.0,
            total_potential_savings: 100.0,
            recommendations: vec![
                Recommendation::new(1, "a", "downsize", 60.0),
                Recommendation::new(2, "b", "terminate", 40.0).implemented(true),
            ],
            savings_percentage: 25.0,
        };

        let overview = derive_overview(5, Some(&summary));
        assert_eq!(overview.total_resources, 5);
        assert_eq!(overview.optimized_cost, 300.0);
        assert_eq!(overview.savings_percentage, 25.0);
        assert_eq!(overview.optimization_opportunities, 1);
        assert_eq!(overview.implemented_savings, 40.0);

        let empty = derive_overview(0, None);
        assert_eq!(empty, DashboardOverview::default());
    }

    #[test]
    fn test_health_score_rules() {
        let idle = health_score(&vm(Some(5.0), Some(10.0)));
        assert_eq!(idle.score, 45);
        assert_eq!(idle.status, HealthStatus::OverProvisioned);
        assert_eq!(idle.issues.len(), 2);

        let hot = health_score(&vm(Some(95.0), Some(10.0)));
        assert_eq!(hot.score, 55);
        assert_eq!(hot.status, HealthStatus::UnderProvisioned);

        let fine = health_score(&vm(Some(50.0), Some(50.0)));
        assert_eq!(fine.score, 100);
        assert_eq!(fine.status, HealthStatus::Optimal);
        assert!(fine.issues.is_empty());
    }

    #[test]
    fn test_health_score_ignores_zero_utilization() {
        let resource = Resource::new(1, "vm", ResourceType::Compute, Provider::Aws, "t3.large", 80.0)
            .with_utilization(0.0, 50.0);

        let assessment = health_score(&resource);
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.status, HealthStatus::Optimal);
        assert!(assessment.issues.is_empty());

        // Classification still reads zero as a reported value
        let idle = resource.with_utilization(0.0, 0.0);
        assert_eq!(health_score(&idle).score, 100);
        assert_eq!(classify(&idle), UtilizationStatus::OverProvisioned);
    }

    #[test]
    fn test_group_by_type_and_provider() {
        let resources = vec![
            Resource::new(1, "a", ResourceType::Compute, Provider::Aws, "t3", 100.0),
            Resource::new(2, "b", ResourceType::Storage, Provider::Aws, "s3", 20.0),
            Resource::new(3, "c", ResourceType::Compute, Provider::Gcp, "e2", 50.0),
        ];

        let by_type = group_by_type(&resources);
        assert_eq!(by_type["compute"].count, 2);
        assert_eq!(by_type["compute"].total_cost, 150.0);
        assert_eq!(by_type["compute"].resources[0].id, 1);
        assert_eq!(by_type["storage"].count, 1);

        let by_provider = group_by_provider(&resources);
        assert_eq!(by_provider["aws"].total_cost, 120.0);
        assert_eq!(by_provider["gcp"].count, 1);
    }
}
