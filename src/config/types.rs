use crate::record::TopicLabel;
use crate::url::{SourceClassifier, DEFAULT_TOPICS};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Page-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Replaces the default topic table when non-empty; file order is precedence
    #[serde(default)]
    pub topics: Vec<TopicEntry>,
}

impl Config {
    /// Builds the topic classifier described by this configuration
    pub fn classifier(&self) -> SourceClassifier {
        if self.topics.is_empty() {
            SourceClassifier::default()
        } else {
            SourceClassifier::new(
                self.topics
                    .iter()
                    .map(|entry| (entry.keyword.as_str(), entry.label)),
            )
        }
    }

    /// Number of keywords the classifier will consult
    pub fn topic_count(&self) -> usize {
        if self.topics.is_empty() {
            DEFAULT_TOPICS.len()
        } else {
            self.topics.len()
        }
    }
}

/// The site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Base URL defining same-site membership
    pub origin: String,

    /// Page whose links form the frontier; defaults to the origin
    #[serde(default)]
    pub seed: Option<String>,
}

impl SiteConfig {
    pub fn seed_url(&self) -> &str {
        self.seed.as_deref().unwrap_or(&self.origin)
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Number of concurrent extraction workers
    pub workers: u32,

    /// Link hops followed from the seed during discovery
    pub max_depth: u32,

    /// Extra render attempts per page after a failure
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each later one (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_depth: 1,
            max_retries: 0,
            retry_backoff_ms: 1000,
        }
    }
}

impl CrawlerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RendererConfig {
    pub user_agent: String,

    /// Upper bound for a single render call (milliseconds)
    pub render_timeout_ms: u64,

    /// Interval between readiness snapshots; 0 disables settling (milliseconds)
    pub settle_poll_ms: u64,

    /// Longest time spent waiting for a page to stop changing (milliseconds)
    pub settle_timeout_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("page-harvest/{}", env!("CARGO_PKG_VERSION")),
            render_timeout_ms: 30_000,
            settle_poll_ms: 0,
            settle_timeout_ms: 0,
        }
    }
}

impl RendererConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn settle_enabled(&self) -> bool {
        self.settle_poll_ms > 0
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Total time one page may take to render, including settling
    pub fn page_timeout(&self) -> Duration {
        if self.settle_enabled() {
            self.render_timeout() + self.settle_timeout()
        } else {
            self.render_timeout()
        }
    }
}

/// How text blocks are selected from a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextMode {
    /// Headings, paragraphs and list items with more than 5 words
    Coarse,
    /// Headings, paragraphs, divs and spans with more than 30 characters
    #[default]
    Fine,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractionConfig {
    pub text_mode: TextMode,
    pub include_documents: bool,
    pub include_images: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            text_mode: TextMode::Fine,
            include_documents: true,
            include_images: true,
        }
    }
}

/// Where records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One CSV file per page
    #[default]
    Csv,
    /// One SQLite database for the whole run
    Sqlite,
}

/// Column layout of written records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSchema {
    #[default]
    Full,
    TextOnly,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub schema: RecordSchema,

    /// Directory receiving CSV files
    pub directory: String,

    /// Path to the SQLite database file
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            schema: RecordSchema::Full,
            directory: "./harvest".to_string(),
            database_path: "./harvest.db".to_string(),
        }
    }
}

/// One keyword-to-label rule of the topic table
#[derive(Debug, Clone, Deserialize)]
pub struct TopicEntry {
    pub keyword: String,
    pub label: TopicLabel,
}
