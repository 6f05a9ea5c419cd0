use std::path::PathBuf;

use thiserror::Error;

/// Retrieving one source failed. Non-fatal: the source contributes no stories.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {source_name} ({url}) failed: {cause}")]
    Request {
        source_name: String,
        url: String,
        #[source]
        cause: reqwest::Error,
    },
    #[error("{source_name} ({url}) returned HTTP {status}")]
    Status {
        source_name: String,
        url: String,
        status: reqwest::StatusCode,
    },
}

/// The body of one source could not be read as a feed. Non-fatal.
#[derive(Debug, Error)]
#[error("could not parse feed from {source_name}: {cause}")]
pub struct ParseError {
    pub source_name: String,
    #[source]
    pub cause: feed_rs::parser::ParseFeedError,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("no categories configured")]
    Empty,
    #[error("category #{0} has an empty id")]
    EmptyCategoryId(usize),
    #[error("duplicate category id '{0}'")]
    DuplicateCategory(String),
    #[error("source '{name}' in category '{category}' has an invalid URL: {url}")]
    InvalidUrl {
        category: String,
        name: String,
        url: String,
    },
}

#[derive(Debug, Error)]
#[error("failed to write {}: {cause}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub cause: std::io::Error,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),
    #[error("failed to serialize structured data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Write(#[from] WriteError),
}
