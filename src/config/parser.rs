use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use page_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Origin: {}", config.site.origin);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The SQLite sink stores this with each run so outputs can be traced back
/// to the settings that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, RecordSchema, TextMode};
    use crate::record::TopicLabel;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[site]
origin = "https://example.org/"
seed = "https://example.org/index"

[crawler]
workers = 8
max-depth = 2
max-retries = 3
retry-backoff-ms = 250

[renderer]
user-agent = "TestHarvester/1.0"
render-timeout-ms = 5000
settle-poll-ms = 200
settle-timeout-ms = 2000

[extraction]
text-mode = "coarse"
include-images = false

[output]
format = "sqlite"
schema = "text-only"
database-path = "./test.db"

[[topics]]
keyword = "ocean"
label = "Ocean Applications"

[[topics]]
keyword = "data"
label = "Dataset"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.seed_url(), "https://example.org/index");
        assert_eq!(config.crawler.workers, 8);
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.renderer.user_agent, "TestHarvester/1.0");
        assert!(config.renderer.settle_enabled());
        assert_eq!(config.renderer.page_timeout(), Duration::from_millis(7000));
        assert_eq!(config.extraction.text_mode, TextMode::Coarse);
        assert!(config.extraction.include_documents);
        assert!(!config.extraction.include_images);
        assert_eq!(config.output.format, OutputFormat::Sqlite);
        assert_eq!(config.output.schema, RecordSchema::TextOnly);
        assert_eq!(config.topics.len(), 2);
        assert_eq!(config.topics[0].label, TopicLabel::OceanApplications);
        assert_eq!(config.topic_count(), 2);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
[site]
origin = "https://example.org/"
"#,
        )
        .unwrap();

        assert_eq!(config.site.seed_url(), "https://example.org/");
        assert_eq!(config.crawler.workers, 4);
        assert_eq!(config.crawler.max_depth, 1);
        assert_eq!(config.crawler.max_retries, 0);
        assert!(!config.renderer.settle_enabled());
        assert_eq!(config.renderer.page_timeout(), config.renderer.render_timeout());
        assert_eq!(config.extraction.text_mode, TextMode::Fine);
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.output.schema, RecordSchema::Full);
        assert!(config.topics.is_empty());
    }

    #[test]
    fn test_custom_topics_drive_classifier() {
        let config = parse_config(
            r#"
[site]
origin = "https://example.org/"

[[topics]]
keyword = "data"
label = "Dataset"

[[topics]]
keyword = "ocean"
label = "Ocean Applications"
"#,
        )
        .unwrap();

        let classifier = config.classifier();
        assert_eq!(
            classifier.classify("https://example.org/ocean-data-portal/"),
            TopicLabel::Dataset
        );
    }

    #[test]
    fn test_unknown_topic_label() {
        let result = parse_config(
            r#"
[site]
origin = "https://example.org/"

[[topics]]
keyword = "tides"
label = "Tides"
"#,
        );
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[site]
origin = "https://example.org/"

[crawler]
workers = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
