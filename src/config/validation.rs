use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, OutputFormat, RendererConfig, SiteConfig, TopicEntry,
};
use crate::url::Origin;
use crate::ConfigError;
use std::collections::HashSet;

/// Upper bound on concurrent extraction workers
pub const MAX_WORKERS: u32 = 64;

/// Upper bound on discovery hop depth
pub const MAX_DEPTH: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    validate_topics(&config.topics)?;
    Ok(())
}

/// Validates the origin and seed URLs
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let origin = Origin::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if let Some(seed) = &config.seed {
        Origin::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if !origin.contains(seed) {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' is outside origin '{}'",
                seed, config.origin
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.max_depth < 1 || config.max_depth > MAX_DEPTH {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 1 and {}, got {}",
            MAX_DEPTH, config.max_depth
        )));
    }

    if config.max_retries > 0 && config.retry_backoff_ms == 0 {
        return Err(ConfigError::Validation(
            "retry_backoff_ms must be > 0 when retries are enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.render_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "render_timeout_ms must be >= 100ms, got {}ms",
            config.render_timeout_ms
        )));
    }

    if config.settle_enabled() && config.settle_timeout_ms < config.settle_poll_ms {
        return Err(ConfigError::Validation(format!(
            "settle_timeout_ms ({}ms) must be >= settle_poll_ms ({}ms)",
            config.settle_timeout_ms, config.settle_poll_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    match config.format {
        OutputFormat::Csv if config.directory.trim().is_empty() => Err(ConfigError::Validation(
            "directory cannot be empty for CSV output".to_string(),
        )),
        OutputFormat::Sqlite if config.database_path.trim().is_empty() => {
            Err(ConfigError::Validation(
                "database_path cannot be empty for SQLite output".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Validates the topic table
fn validate_topics(topics: &[TopicEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in topics {
        let keyword = entry.keyword.trim().to_lowercase();

        if keyword.is_empty() {
            return Err(ConfigError::Validation(
                "topic keyword cannot be empty".to_string(),
            ));
        }

        if !seen.insert(keyword) {
            return Err(ConfigError::Validation(format!(
                "duplicate topic keyword '{}'",
                entry.keyword
            )));
        }
    }

    Ok(())
}
