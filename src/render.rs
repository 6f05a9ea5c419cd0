use askama::Template;
use chrono::{DateTime, Datelike, Utc};
use serde_json::json;

use crate::aggregator::{CategoryResult, TopStory};
use crate::error::RenderError;
use crate::parser::StoryItem;

/// Stories younger than this get a "New" badge.
const NEW_STORY_HOURS: i64 = 6;

#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
}

/// Everything the page depends on. Rendering reads no clock or environment,
/// so equal pages render to equal bytes.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub site: &'a SiteInfo,
    pub generated_at: DateTime<Utc>,
    pub top_stories: &'a [TopStory],
    pub categories: &'a [CategoryResult],
}

// Template structs
#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    site: &'a SiteInfo,
    updated_at: String,
    year: i32,
    top_stories: Vec<StoryView>,
    categories: Vec<CategoryView>,
}

#[derive(Template)]
#[template(path = "sitemap.xml")]
struct SitemapTemplate {
    urls: Vec<SitemapUrl>,
    lastmod: String,
}

struct SitemapUrl {
    loc: String,
    changefreq: &'static str,
    priority: &'static str,
}

struct CategoryView {
    id: String,
    label: String,
    stories: Vec<StoryView>,
}

struct StoryView {
    title: String,
    link: String,
    source_name: String,
    description: String,
    /// Empty outside the top stories section
    category_label: String,
    date_str: String,
    time_ago: String,
    is_new: bool,
}

impl StoryView {
    fn new(story: &StoryItem, category_label: Option<&str>, now: DateTime<Utc>) -> Self {
        let (date_str, time_ago, is_new) = match story.published_at {
            Some(published) => (
                published.format("%b %d, %Y").to_string(),
                time_ago(published, now),
                (now - published).num_hours() < NEW_STORY_HOURS && published <= now,
            ),
            None => (String::new(), String::new(), false),
        };

        Self {
            title: story.title.clone(),
            link: story.link.clone(),
            source_name: story.source_name.clone(),
            description: story.description.clone(),
            category_label: category_label.unwrap_or_default().to_string(),
            date_str,
            time_ago,
            is_new,
        }
    }
}

/// Human readable age of `published` as seen at `now`.
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - published).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("{} {} ago", n, unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    if minutes < 60 {
        plural(minutes, "min")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        published.format("%b %d, %Y").to_string()
    }
}

/// Render the front page. Titles, source names, descriptions and links are
/// HTML-escaped by the template engine.
pub fn render_page(page: &Page<'_>) -> Result<String, RenderError> {
    let now = page.generated_at;

    let template = PageTemplate {
        site: page.site,
        updated_at: now.format("%B %d, %Y at %H:%M UTC").to_string(),
        year: now.year(),
        top_stories: page
            .top_stories
            .iter()
            .map(|top| StoryView::new(&top.story, Some(top.category_label.as_str()), now))
            .collect(),
        categories: page
            .categories
            .iter()
            .map(|category| CategoryView {
                id: category.id.clone(),
                label: category.label.clone(),
                stories: category
                    .stories
                    .iter()
                    .map(|story| StoryView::new(story, None, now))
                    .collect(),
            })
            .collect(),
    };

    Ok(template.render()?)
}

pub fn render_sitemap(site_url: &str, generated_at: DateTime<Utc>) -> Result<String, RenderError> {
    let base = site_url.trim_end_matches('/');
    let template = SitemapTemplate {
        urls: vec![SitemapUrl {
            loc: format!("{}/", base),
            changefreq: "daily",
            priority: "1.0",
        }],
        lastmod: generated_at.format("%Y-%m-%d").to_string(),
    };

    Ok(template.render()?)
}

/// schema.org `WebSite` description of the site as JSON-LD.
pub fn render_structured_data(
    site: &SiteInfo,
    site_url: &str,
    generated_at: DateTime<Utc>,
) -> Result<String, RenderError> {
    let data = json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": site.title,
        "description": site.description,
        "url": site_url,
        "publisher": {
            "@type": "Organization",
            "name": site.title,
            "url": site_url,
        },
        "dateModified": generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    });

    Ok(serde_json::to_string_pretty(&data)?)
}
