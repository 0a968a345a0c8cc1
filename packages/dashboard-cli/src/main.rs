//! Operator CLI for the cloud cost dashboard
//!
//! Loads every dashboard source from the optimization service and prints
//! overview figures, the resource table, recommendations or health data.

mod config;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dashboard_core::metrics::{group_by_provider, group_by_type, health_score};
use dashboard_core::{
    CoordinatorConfig, DataCoordinator, Filter, Provider, ResourceExplorer, ResourceQuery,
    ResourceType, SortDirection, SortField,
};
use optimizer_client::OptimizerClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Cloud cost optimization dashboard")]
struct Cli {
    /// Override OPTIMIZER_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline figures, cost breakdown and any source errors
    Overview,

    /// Searchable, filterable resource table
    Resources {
        /// Case-insensitive match on name or instance type
        #[arg(long)]
        search: Option<String>,
        /// aws, azure, gcp or all
        #[arg(long, default_value = "all")]
        provider: String,
        /// compute, storage, database, cache or all
        #[arg(long = "type", default_value = "all")]
        resource_type: String,
        #[arg(long, default_value = "monthly_cost")]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resource counts and cost grouped by a dimension
    Groups {
        #[arg(long, value_enum, default_value_t = GroupBy::Provider)]
        by: GroupBy,
    },

    /// Recommendations, optionally marking some as implemented for this session
    Recommendations {
        /// Resource ids whose recommendations count as implemented
        #[arg(long = "implemented", value_delimiter = ',')]
        implemented: Vec<i64>,
    },

    /// Check whether the optimization service is reachable
    Health,

    /// Health score of one resource
    ResourceHealth { id: i64 },

    /// Interactive search: each stdin line is search input,
    /// `:provider X`, `:type X`, `:sort FIELD` and `:view` are commands
    Explore,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Provider,
    Type,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dashboard_core=debug,optimizer_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    tracing::debug!(api_url = %config.api_url, health_url = %config.health_url, "Configuration loaded");

    let client = OptimizerClient::with_timeout(
        config.api_url.clone(),
        config.health_url.clone(),
        config.request_timeout,
    )
    .context("Failed to build HTTP client")?;
    let coordinator = DataCoordinator::with_config(
        Arc::new(client),
        CoordinatorConfig {
            fetch_timeout: config.fetch_timeout,
        },
    );

    match cli.command {
        Commands::Overview => overview(&coordinator).await,
        Commands::Resources {
            search,
            provider,
            resource_type,
            sort,
            asc,
            json,
        } => {
            let direction = if asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
            let query = ResourceQuery::new()
                .with_search(search.unwrap_or_default())
                .with_provider(Filter::parse(&provider))
                .with_type(Filter::parse(&resource_type))
                .sorted_by(
                    sort.parse::<SortField>()
                        .with_context(|| format!("invalid --sort {sort}"))?,
                    direction,
                );
            resources(&coordinator, &query, json).await
        }
        Commands::Groups { by } => groups(&coordinator, by).await,
        Commands::Recommendations { implemented } => {
            recommendations(&coordinator, &implemented).await
        }
        Commands::Health => {
            let health = coordinator.check_health().await;
            render::backend_health(&health);
            if !health.is_reachable() {
                bail!("optimization service is unreachable");
            }
            Ok(())
        }
        Commands::ResourceHealth { id } => resource_health(&coordinator, id).await,
        Commands::Explore => explore(&coordinator, config.search_debounce).await,
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn overview(coordinator: &DataCoordinator) -> Result<()> {
    coordinator.load(false).await;
    let state = coordinator.snapshot();

    render::failures(&state);
    render::overview(&state, &state.overview());
    if let Some(analytics) = state.analytics.data() {
        render::analytics(analytics);
    }
    Ok(())
}

async fn resources(coordinator: &DataCoordinator, query: &ResourceQuery, json: bool) -> Result<()> {
    coordinator.load(false).await;
    let state = coordinator.snapshot();
    if let Some(error) = state.resources.error() {
        bail!("failed to load resources: {error}");
    }

    let all = state.resources.data();
    let view = query.apply(all);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Failed to encode resources")?
        );
        return Ok(());
    }

    render::resources(
        &view,
        dashboard_core::ViewCounts {
            shown: view.len(),
            total: all.len(),
        },
    );
    Ok(())
}

async fn groups(coordinator: &DataCoordinator, by: GroupBy) -> Result<()> {
    coordinator.load(false).await;
    let state = coordinator.snapshot();
    render::failures(&state);

    let resources = state.resources.data();
    match by {
        GroupBy::Provider => render::groups("By provider", &group_by_provider(resources)),
        GroupBy::Type => render::groups("By type", &group_by_type(resources)),
    }
    Ok(())
}

async fn recommendations(coordinator: &DataCoordinator, implemented: &[i64]) -> Result<()> {
    coordinator.load(false).await;

    for &resource_id in implemented {
        if coordinator.set_implemented(resource_id, true) == 0 {
            println!(
                "{}",
                format!("No recommendations for resource {resource_id}").yellow()
            );
        }
    }

    let state = coordinator.snapshot();
    if let Some(error) = state.recommendations.error() {
        bail!("failed to load recommendations: {error}");
    }

    render::recommendations(state.recommendations.data().recommendations());
    render::overview(&state, &state.overview());
    Ok(())
}

async fn resource_health(coordinator: &DataCoordinator, id: i64) -> Result<()> {
    match coordinator.resource_health(id).await {
        Ok(health) => render::resource_health(&health),
        Err(error) => {
            println!("{} {}", "✗".red().bold(), error);

            // Fall back to a local estimate from the resource list
            coordinator.load(false).await;
            let state = coordinator.snapshot();
            let Some(resource) = state.resources.data().iter().find(|r| r.id == id) else {
                bail!("resource {id} not found");
            };
            render::local_health(resource, &health_score(resource));
        }
    }
    Ok(())
}

async fn explore(coordinator: &DataCoordinator, debounce: Duration) -> Result<()> {
    coordinator.load(false).await;
    let state = coordinator.snapshot();
    render::failures(&state);

    let explorer = ResourceExplorer::with_debounce(state.resources.data().clone(), debounce);
    render::resources(&explorer.view(), explorer.counts());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim_end();
        let Some(command) = line.strip_prefix(':') else {
            explorer.input_search(line);
            continue;
        };

        let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "provider" => explorer.set_provider_filter(Filter::<Provider>::parse(arg)),
            "type" => explorer.set_type_filter(Filter::<ResourceType>::parse(arg)),
            "sort" => match arg.parse::<SortField>() {
                Ok(field) => explorer.toggle_sort(field),
                Err(e) => {
                    println!("{}", e.to_string().yellow());
                    continue;
                }
            },
            "view" => {
                // Let any pending search input commit first
                tokio::time::sleep(debounce + Duration::from_millis(10)).await;
            }
            other => {
                println!("{}", format!("unknown command :{other}").yellow());
                continue;
            }
        }
        render::resources(&explorer.view(), explorer.counts());
    }
    Ok(())
}
