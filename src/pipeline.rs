use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::aggregator::{aggregate, top_stories, CategoryResult};
use crate::config::Config;
use crate::error::BuildError;
use crate::fetcher::{FetchOptions, Fetcher};
use crate::parser::ParseOptions;
use crate::registry::Registry;
use crate::render::{render_page, render_sitemap, render_structured_data, Page, SiteInfo};
use crate::writer::write_atomic;

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub sources_ok: usize,
    pub sources_failed: usize,
    /// Story count per category id, in registry order
    pub stories_per_category: Vec<(String, usize)>,
    pub top_stories: usize,
}

/// Run one full build: fetch, aggregate, render and write.
///
/// Source failures only shrink their category. Nothing is written unless every
/// artifact rendered. The page is written first; if a later sitemap or
/// structured-data write fails the build still errors, with the new page in
/// place.
pub async fn run(config: &Config, now: DateTime<Utc>) -> Result<BuildReport, BuildError> {
    let registry = Registry::from_config(&config.categories)?;
    info!(
        "Building from {} sources in {} categories",
        registry.source_count(),
        registry.categories().len()
    );

    let fetcher = Fetcher::new(FetchOptions {
        timeout: Duration::from_secs(config.fetch_timeout_seconds),
        max_concurrent: config.max_concurrent_fetches,
        retry_backoff: (config.retry_backoff_ms > 0)
            .then(|| Duration::from_millis(config.retry_backoff_ms)),
    })?;
    let parse_options = ParseOptions {
        max_description_length: config.max_description_length,
    };

    let mut sources_ok = 0;
    let mut sources_failed = 0;
    let mut results: Vec<CategoryResult> = Vec::with_capacity(registry.categories().len());

    for category in registry.categories() {
        info!("Category: {}", category.label);
        let outcomes = fetcher.fetch_category(category, &parse_options).await;

        let per_source = outcomes
            .into_iter()
            .map(|outcome| {
                if outcome.result.is_ok() {
                    sources_ok += 1;
                } else {
                    sources_failed += 1;
                }
                outcome.into_stories()
            })
            .collect();

        let result = aggregate(
            category,
            per_source,
            config.max_items_per_category,
            config.dedupe_links,
        );
        if result.stories.is_empty() {
            warn!("No stories for category '{}'", category.id);
        } else {
            info!("Found {} stories for '{}'", result.stories.len(), category.id);
        }
        results.push(result);
    }

    let top = top_stories(&results, now, &config.top_stories);
    info!(
        "Top stories: {} from the last {} hours",
        top.len(),
        config.top_stories.max_age_hours
    );

    let site = SiteInfo {
        title: config.site_title.clone(),
        description: config.site_description.clone(),
        url: config.site_url.clone(),
    };
    let html = render_page(&Page {
        site: &site,
        generated_at: now,
        top_stories: &top,
        categories: &results,
    })?;

    let extras = match &site.url {
        Some(url) => vec![
            (sibling(&config.output_path, "sitemap.xml"), render_sitemap(url, now)?),
            (
                sibling(&config.output_path, "structured-data.json"),
                render_structured_data(&site, url, now)?,
            ),
        ],
        None => Vec::new(),
    };

    write_atomic(&config.output_path, &html)?;
    for (path, contents) in &extras {
        write_atomic(path, contents)?;
    }

    Ok(BuildReport {
        output_path: config.output_path.clone(),
        sources_ok,
        sources_failed,
        stories_per_category: results
            .iter()
            .map(|r| (r.id.clone(), r.stories.len()))
            .collect(),
        top_stories: top.len(),
    })
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    path.with_file_name(file_name)
}
