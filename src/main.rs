use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tech_insights::config::{Config, Overrides};
use tech_insights::pipeline;

/// Fetch the configured feeds and render them into a static HTML page.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Feed list and settings
    #[arg(long, env = "TECH_INSIGHTS_CONFIG", default_value = "feeds.toml")]
    config: PathBuf,

    /// Where to write the HTML page
    #[arg(long, env = "OUTPUT_PATH")]
    output: Option<PathBuf>,

    /// Maximum number of stories per category
    #[arg(long, env = "MAX_ITEMS_PER_CATEGORY")]
    max_items: Option<usize>,

    /// Per-source fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECONDS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tech_insights=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    config.apply(Overrides {
        output_path: args.output,
        max_items_per_category: args.max_items,
        fetch_timeout_seconds: args.timeout,
    });

    let report = pipeline::run(&config, chrono::Utc::now()).await?;
    info!(
        "Generated {} ({} sources ok, {} failed, {} top stories)",
        report.output_path.display(),
        report.sources_ok,
        report.sources_failed,
        report.top_stories
    );

    Ok(())
}
