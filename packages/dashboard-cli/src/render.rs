//! Terminal rendering for dashboard data.

use colored::{Color, ColoredString, Colorize};
use dashboard_core::metrics::{
    classify, confidence_style, format_currency, format_percentage, provider_info,
    recommendation_type_style, resource_type_info, ResourceGroup, Tone,
};
use dashboard_core::{
    BackendHealth, CostAnalytics, DashboardOverview, DashboardState, HealthAssessment,
    Recommendation, Resource, ResourceHealth, ViewCounts,
};
use std::collections::BTreeMap;

fn color(tone: Tone) -> Color {
    match tone {
        Tone::Gray => Color::BrightBlack,
        Tone::Orange => Color::TrueColor {
            r: 255,
            g: 153,
            b: 0,
        },
        Tone::Amber => Color::TrueColor {
            r: 255,
            g: 191,
            b: 0,
        },
        Tone::Yellow => Color::Yellow,
        Tone::Blue => Color::Blue,
        Tone::Green => Color::Green,
        Tone::Purple => Color::Magenta,
        Tone::Red => Color::Red,
    }
}

fn toned(text: &str, tone: Tone) -> ColoredString {
    text.color(color(tone))
}

fn section(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
    println!("{}", "─".repeat(title.chars().count()).bright_cyan());
}

pub fn failures(state: &DashboardState) {
    let failures = state.failures();
    if failures.is_empty() {
        return;
    }

    for failure in &failures {
        println!(
            "{} {}: {}",
            "✗".red().bold(),
            failure.source.label().red(),
            failure.message
        );
    }
    println!(
        "  {}",
        "Run `dashboard health` to check backend status.".bright_black()
    );
}

pub fn overview(state: &DashboardState, overview: &DashboardOverview) {
    section("Overview");
    println!("  Resources:              {}", overview.total_resources);
    println!(
        "  Monthly cost:           {}",
        format_currency(overview.total_monthly_cost).bold()
    );
    println!(
        "  Potential savings:      {} ({})",
        format_currency(overview.total_potential_savings).green(),
        format_percentage(overview.savings_percentage)
    );
    println!(
        "  Optimized cost:         {}",
        format_currency(overview.optimized_cost)
    );
    println!(
        "  Opportunities:          {}",
        overview.optimization_opportunities
    );
    println!(
        "  Pending / implemented:  {} / {}",
        format_currency(overview.pending_savings),
        format_currency(overview.implemented_savings)
    );

    if let Some(at) = state.last_refresh {
        println!(
            "  {}",
            format!("Last updated {}", at.format("%Y-%m-%d %H:%M:%S UTC")).bright_black()
        );
    }
}

pub fn analytics(analytics: &CostAnalytics) {
    section("Cost by provider");
    for (name, bucket) in &analytics.cost_by_provider {
        let info = provider_info(&name.as_str().into());
        println!(
            "  {:<10} {:>4} resources  {}",
            toned(&info.name, info.tone),
            bucket.count,
            format_currency(bucket.cost)
        );
    }

    section("Cost by type");
    for (name, bucket) in &analytics.cost_by_type {
        let info = resource_type_info(&name.as_str().into());
        println!(
            "  {} {:<10} {:>4} resources  {}",
            info.icon,
            toned(&info.name, info.tone),
            bucket.count,
            format_currency(bucket.cost)
        );
    }
}

pub fn resources(view: &[Resource], counts: ViewCounts) {
    section(&format!("{} of {} resources", counts.shown, counts.total));
    for resource in view {
        let provider = provider_info(&resource.provider);
        let kind = resource_type_info(&resource.resource_type);
        let status = classify(resource);
        let utilization = match resource.utilization() {
            Some((cpu, memory)) => format!("cpu {:>5.1}%  mem {:>5.1}%", cpu, memory),
            None => "no metrics".to_string(),
        };
        println!(
            "  {:>5}  {:<24} {} {:<9} {:<6} {:<14} {:>12}  {:<24} {}",
            resource.id,
            resource.name,
            kind.icon,
            toned(&kind.name, kind.tone),
            toned(&provider.name, provider.tone),
            resource.instance_type,
            format_currency(resource.monthly_cost),
            utilization,
            toned(status.as_str(), status.tone()),
        );
    }
}

pub fn groups(title: &str, groups: &BTreeMap<String, ResourceGroup>) {
    section(title);
    for (name, group) in groups {
        println!(
            "  {:<12} {:>4} resources  {}",
            name,
            group.count,
            format_currency(group.total_cost)
        );
    }
}

pub fn recommendations(recommendations: &[Recommendation]) {
    section(&format!("{} recommendations", recommendations.len()));
    for rec in recommendations {
        let style = recommendation_type_style(&rec.recommendation_type);
        let confidence = confidence_style(&rec.confidence_level);
        let marker = if rec.implemented {
            "✓".green().bold()
        } else {
            "•".normal()
        };
        println!(
            "  {} {} {:<24} {:<22} save {:>10}/mo  {}",
            marker,
            style.icon,
            rec.resource_name,
            toned(&rec.recommendation_type, style.tone),
            format_currency(rec.estimated_savings).green(),
            toned(confidence.text, confidence.tone),
        );
        if !rec.recommended_action.is_empty() {
            println!("      {}", rec.recommended_action.bright_black());
        }
    }
}

pub fn backend_health(health: &BackendHealth) {
    match health {
        BackendHealth::Reachable(info) => println!(
            "{} {} (v{}): {}",
            "●".green(),
            info.status.green().bold(),
            info.version,
            info.message
        ),
        BackendHealth::Unreachable(error) => {
            println!("{} {}: {}", "●".red(), "unreachable".red().bold(), error)
        }
    }
}

pub fn resource_health(health: &ResourceHealth) {
    section(&format!("Health of {}", health.resource_name));
    println!("  Score:   {}/100 ({})", health.health_score, health.status);
    println!("  Cost:    {}", format_currency(health.monthly_cost));
    for issue in &health.issues {
        println!("  {} {}", "!".yellow(), issue);
    }
}

pub fn local_health(resource: &Resource, assessment: &HealthAssessment) {
    section(&format!("Local estimate for {}", resource.name));
    println!(
        "  Score:   {}/100 ({})",
        assessment.score,
        assessment.status.as_str()
    );
    for issue in &assessment.issues {
        println!("  {} {}", "!".yellow(), issue);
    }
}
