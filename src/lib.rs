//! Page-Harvest: a single-site content harvester
//!
//! This crate discovers the internally-linked pages of one website and turns
//! each page into flat content records (text blocks, PDF references, image
//! references) suitable for tabular storage.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Page-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure to produce rendered HTML for a URL
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Render of {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Network error for {url}: {cause}")]
    Network { url: String, cause: String },

    #[error("Navigation to {url} failed: {cause}")]
    Navigation { url: String, cause: String },
}

impl RenderError {
    /// The URL whose render failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. } | Self::Network { url, .. } | Self::Navigation { url, .. } => {
                url
            }
        }
    }
}

/// Rendered HTML could not be processed
#[derive(Debug, Clone, Error)]
#[error("HTML parse error for {url}: {message}")]
pub struct ParseError {
    pub url: String,
    pub message: String,
}

/// Persisting records failed
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Sink lock poisoned")]
    Poisoned,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Page-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlReport, Renderer};
pub use output::Sink;
pub use record::{ContentRecord, SectionType, TopicLabel};
pub use url::{classify, normalize, sink_key, Origin, PageUrl, SourceClassifier};
