use std::collections::HashSet;

use url::Url;

use crate::config::CategoryConfig;
use crate::error::RegistryError;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Short slug, used as the HTML anchor
    pub id: String,
    pub label: String,
    pub sources: Vec<FeedSource>,
}

/// Validated, ordered list of categories and their sources.
#[derive(Debug, Clone)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Registry {
    pub fn new(categories: Vec<Category>) -> Result<Self, RegistryError> {
        if categories.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, category) in categories.iter().enumerate() {
            if category.id.trim().is_empty() {
                return Err(RegistryError::EmptyCategoryId(index));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(RegistryError::DuplicateCategory(category.id.clone()));
            }
            for source in &category.sources {
                if !is_http_url(&source.url) {
                    return Err(RegistryError::InvalidUrl {
                        category: category.id.clone(),
                        name: source.name.clone(),
                        url: source.url.clone(),
                    });
                }
            }
        }

        Ok(Self { categories })
    }

    pub fn from_config(configs: &[CategoryConfig]) -> Result<Self, RegistryError> {
        let categories = configs
            .iter()
            .map(|c| Category {
                id: c.id.clone(),
                label: c.label.clone(),
                sources: c
                    .feeds
                    .iter()
                    .map(|f| FeedSource {
                        name: f.name.clone(),
                        url: f.url.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self::new(categories)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn source_count(&self) -> usize {
        self.categories.iter().map(|c| c.sources.len()).sum()
    }
}

/// True for absolute http(s) URLs with a host.
pub fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
