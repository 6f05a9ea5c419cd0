use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{info, warn};

use crate::error::{FetchError, SourceError};
use crate::parser::{parse_feed, ParseOptions, StoryItem};
use crate::registry::{Category, FeedSource};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Applies to each request on its own, not to the whole category
    pub timeout: Duration,
    pub max_concurrent: usize,
    /// Wait before the single retry; `None` disables retrying
    pub retry_backoff: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_concurrent: 4,
            retry_backoff: None,
        }
    }
}

/// What one source contributed to a build.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: FeedSource,
    pub result: Result<Vec<StoryItem>, SourceError>,
}

impl SourceOutcome {
    /// Stories of the source, empty if it failed.
    pub fn into_stories(self) -> Vec<StoryItem> {
        self.result.unwrap_or_default()
    }
}

pub struct Fetcher {
    client: Client,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(options: FetchOptions) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent("TechInsights/1.0 (RSS Aggregator)")
            .build()?;

        Ok(Self { client, options })
    }

    /// GET the feed body. Non-2xx responses are errors.
    pub async fn fetch(&self, source: &FeedSource) -> Result<Vec<u8>, FetchError> {
        match self.fetch_once(source).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => match self.options.retry_backoff {
                Some(backoff) => {
                    warn!("Fetching '{}' failed ({}), retrying in {:?}", source.name, e, backoff);
                    tokio::time::sleep(backoff).await;
                    self.fetch_once(source).await
                }
                None => Err(e),
            },
        }
    }

    async fn fetch_once(&self, source: &FeedSource) -> Result<Vec<u8>, FetchError> {
        let request_error = |cause: reqwest::Error| FetchError::Request {
            source_name: source.name.clone(),
            url: source.url.clone(),
            cause,
        };

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                source_name: source.name.clone(),
                url: source.url.clone(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        Ok(bytes.to_vec())
    }

    pub async fn fetch_source(
        &self,
        source: &FeedSource,
        parse_options: &ParseOptions,
    ) -> Result<Vec<StoryItem>, SourceError> {
        info!("Fetching feed: {} ({})", source.name, source.url);
        let bytes = self.fetch(source).await?;
        let stories = parse_feed(&bytes, &source.name, parse_options)?;
        info!("Parsed {} stories from '{}'", stories.len(), source.name);
        Ok(stories)
    }

    /// Fetch and parse every source of `category`.
    ///
    /// Up to `max_concurrent` sources are in flight at once. The outcomes are
    /// returned in registry order whatever order the requests finish in.
    pub async fn fetch_category(
        &self,
        category: &Category,
        parse_options: &ParseOptions,
    ) -> Vec<SourceOutcome> {
        let outcomes: Vec<SourceOutcome> = stream::iter(&category.sources)
            .map(|source| async move {
                let result = self.fetch_source(source, parse_options).await;
                if let Err(e) = &result {
                    warn!("Skipping source '{}': {}", source.name, e);
                }
                SourceOutcome {
                    source: source.clone(),
                    result,
                }
            })
            .buffered(self.options.max_concurrent.max(1))
            .collect()
            .await;

        outcomes
    }
}
