use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Where the rendered page is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_max_items_per_category")]
    pub max_items_per_category: usize,
    /// Per-source timeout in seconds
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Delay before the single retry of a failed fetch; 0 disables the retry
    #[serde(default)]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    /// Drop repeated links within a category
    #[serde(default)]
    pub dedupe_links: bool,
    #[serde(default = "default_site_title")]
    pub site_title: String,
    #[serde(default = "default_site_description")]
    pub site_description: String,
    /// Public URL of the site; enables sitemap.xml and structured-data.json
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub top_stories: TopStoriesConfig,
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TopStoriesConfig {
    #[serde(default = "default_top_count")]
    pub count: usize,
    #[serde(default = "default_top_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_top_max_per_category")]
    pub max_per_category: usize,
}

impl Default for TopStoriesConfig {
    fn default() -> Self {
        Self {
            count: default_top_count(),
            max_age_hours: default_top_max_age_hours(),
            max_per_category: default_top_max_per_category(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("docs/index.html")
}

fn default_max_items_per_category() -> usize {
    10
}

fn default_fetch_timeout_seconds() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_max_description_length() -> usize {
    200
}

fn default_site_title() -> String {
    "Tech Insights".to_string()
}

fn default_site_description() -> String {
    "Daily curated news on AI, developer tools, and the tech industry".to_string()
}

fn default_top_count() -> usize {
    10
}

fn default_top_max_age_hours() -> u64 {
    24
}

fn default_top_max_per_category() -> usize {
    3
}

/// Values that take precedence over the config file, usually from flags or
/// environment variables.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub output_path: Option<PathBuf>,
    pub max_items_per_category: Option<usize>,
    pub fetch_timeout_seconds: Option<u64>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(path) = overrides.output_path {
            self.output_path = path;
        }
        if let Some(max_items) = overrides.max_items_per_category {
            self.max_items_per_category = max_items;
        }
        if let Some(timeout) = overrides.fetch_timeout_seconds {
            self.fetch_timeout_seconds = timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
        [[categories]]
        id = "ai"
        label = "AI"

        [[categories.feeds]]
        name = "Test Feed"
        url = "https://example.com/feed.xml"
    "#;

    #[test]
    fn test_defaults() {
        let config = Config::from_str(MINIMAL).unwrap();

        assert_eq!(config.output_path, PathBuf::from("docs/index.html"));
        assert_eq!(config.max_items_per_category, 10);
        assert_eq!(config.fetch_timeout_seconds, 10);
        assert_eq!(config.max_concurrent_fetches, 4);
        assert_eq!(config.retry_backoff_ms, 0);
        assert_eq!(config.max_description_length, 200);
        assert!(!config.dedupe_links);
        assert_eq!(config.site_title, "Tech Insights");
        assert!(config.site_url.is_none());
        assert_eq!(config.top_stories, TopStoriesConfig::default());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            output_path = "public/news.html"
            max_items_per_category = 5
            fetch_timeout_seconds = 3
            site_url = "https://news.example.com"

            [top_stories]
            count = 6

            [[categories]]
            id = "ai"
            label = "AI"

            [[categories.feeds]]
            name = "Test Feed"
            url = "https://example.com/feed.xml"

            [[categories.feeds]]
            name = "Another Feed"
            url = "https://example.org/rss"

            [[categories]]
            id = "security"
            label = "Security"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.output_path, PathBuf::from("public/news.html"));
        assert_eq!(config.max_items_per_category, 5);
        assert_eq!(config.fetch_timeout_seconds, 3);
        assert_eq!(config.site_url.as_deref(), Some("https://news.example.com"));
        assert_eq!(config.top_stories.count, 6);
        assert_eq!(config.top_stories.max_per_category, 3); // Default value
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].feeds.len(), 2);
        assert_eq!(config.categories[0].feeds[1].name, "Another Feed");
        assert!(config.categories[1].feeds.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_required_fields() {
        let content = r#"
            [[categories]]
            id = "ai"
            label = "AI"

            [[categories.feeds]]
            name = "Test Feed"
            # Missing url field
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_categories_is_an_error() {
        let result = Config::from_str("max_items_per_category = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_top_story_age_is_rejected() {
        let content = r#"
            categories = []

            [top_stories]
            max_age_hours = -1
        "#;
        assert!(Config::from_str(content).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::from_str(MINIMAL).unwrap();
        config.apply(Overrides {
            output_path: Some(PathBuf::from("/tmp/out.html")),
            max_items_per_category: Some(4),
            fetch_timeout_seconds: None,
        });

        assert_eq!(config.output_path, PathBuf::from("/tmp/out.html"));
        assert_eq!(config.max_items_per_category, 4);
        assert_eq!(config.fetch_timeout_seconds, 10);
    }
}
