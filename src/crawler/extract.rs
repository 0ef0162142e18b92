//! Content extraction
//!
//! Turns one rendered page into content records with three independent
//! passes over the same document:
//!
//! 1. Text blocks (headings, paragraphs and friends, per [`TextMode`])
//! 2. PDF links, with any advertised file size captured in `notes`
//! 3. Images, labelled by their `alt` text

use crate::config::{ExtractionConfig, RecordSchema, TextMode};
use crate::crawler::parser::{element_text, extract_title, selector};
use crate::crawler::renderer::{render_bounded, Renderer};
use crate::record::{ContentRecord, SectionType, TopicLabel};
use crate::url::{resolve, Origin, PageUrl, SourceClassifier};
use crate::{HarvestError, ParseError};
use regex::Regex;
use scraper::Html;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Tags scanned by coarse text extraction
const COARSE_TAGS: &[&str] = &["h1", "h2", "h3", "p", "li"];

/// Tags scanned by fine text extraction
const FINE_TAGS: &[&str] = &["h1", "h2", "h3", "p", "div", "span"];

/// Coarse mode keeps blocks with more than this many words
const MIN_COARSE_WORDS: usize = 5;

/// Fine mode keeps blocks with more than this many characters
const MIN_FINE_CHARS: usize = 30;

/// Which passes run and how text is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub text_mode: TextMode,
    pub include_documents: bool,
    pub include_images: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl ExtractOptions {
    /// Options for a run writing `schema`
    ///
    /// The text-only schema has no columns for document or image records, so
    /// those passes are switched off.
    pub fn for_schema(config: &ExtractionConfig, schema: RecordSchema) -> Self {
        let options = Self::from(config);
        match schema {
            RecordSchema::Full => options,
            RecordSchema::TextOnly => Self {
                include_documents: false,
                include_images: false,
                ..options
            },
        }
    }
}

impl From<&ExtractionConfig> for ExtractOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            text_mode: config.text_mode,
            include_documents: config.include_documents,
            include_images: config.include_images,
        }
    }
}

/// Fields shared by every record from one page
struct PageContext<'a> {
    title: String,
    url: &'a PageUrl,
    source_type: TopicLabel,
}

impl PageContext<'_> {
    fn record(
        &self,
        section_type: SectionType,
        content_label: String,
        source_url: Option<PageUrl>,
        notes: Option<String>,
    ) -> ContentRecord {
        ContentRecord {
            page_title: self.title.clone(),
            page_url: self.url.clone(),
            source_type: self.source_type,
            section_type,
            content_label,
            source_url,
            notes,
        }
    }
}

/// Extracts content records from already-rendered HTML
///
/// # Arguments
///
/// * `html` - Rendered page HTML
/// * `page_url` - The page's normalized URL
/// * `origin` - Site origin, used to resolve relative document and image links
/// * `classifier` - Topic table; consulted once per page
/// * `options` - Text mode and enabled passes
///
/// # Returns
///
/// Records in pass order: text, then PDFs, then images. Repeated content is
/// not deduplicated.
pub fn extract_records(
    html: &str,
    page_url: &PageUrl,
    origin: &Origin,
    classifier: &SourceClassifier,
    options: &ExtractOptions,
) -> Result<Vec<ContentRecord>, ParseError> {
    let document = Html::parse_document(html);
    let page = PageContext {
        title: extract_title(&document, page_url.as_str())?,
        url: page_url,
        source_type: classifier.classify(page_url.as_str()),
    };

    let mut records = text_pass(&document, &page, options.text_mode)?;

    if options.include_documents {
        records.extend(pdf_pass(&document, &page, origin)?);
    }

    if options.include_images {
        records.extend(image_pass(&document, &page, origin)?);
    }

    Ok(records)
}

fn text_pass(
    document: &Html,
    page: &PageContext<'_>,
    mode: TextMode,
) -> Result<Vec<ContentRecord>, ParseError> {
    let tags = match mode {
        TextMode::Coarse => COARSE_TAGS,
        TextMode::Fine => FINE_TAGS,
    };
    let blocks = selector(&tags.join(", "), page.url.as_str())?;

    let mut records = Vec::new();
    for element in document.select(&blocks) {
        let text = element_text(&element);

        let section_type = match mode {
            TextMode::Coarse if text.split_whitespace().count() > MIN_COARSE_WORDS => {
                SectionType::from_tag(element.value().name()).unwrap_or(SectionType::Text)
            }
            TextMode::Fine if text.chars().count() > MIN_FINE_CHARS => SectionType::Text,
            _ => continue,
        };

        records.push(page.record(section_type, text, None, None));
    }

    Ok(records)
}

fn pdf_pass(
    document: &Html,
    page: &PageContext<'_>,
    origin: &Origin,
) -> Result<Vec<ContentRecord>, ParseError> {
    let anchors = selector("a[href]", page.url.as_str())?;

    Ok(document
        .select(&anchors)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            if !href.to_lowercase().contains(".pdf") {
                return None;
            }

            let label = element_text(&element);
            let size = parse_size(&label);
            Some(page.record(SectionType::Pdf, label, Some(resolve(href, origin)), size))
        })
        .collect())
}

fn image_pass(
    document: &Html,
    page: &PageContext<'_>,
    origin: &Origin,
) -> Result<Vec<ContentRecord>, ParseError> {
    let images = selector("img[src]", page.url.as_str())?;

    Ok(document
        .select(&images)
        .filter_map(|element| {
            let src = element.value().attr("src")?;
            let alt = element.value().attr("alt").unwrap_or_default();
            Some(page.record(
                SectionType::Image,
                alt.to_string(),
                Some(resolve(src, origin)),
                None,
            ))
        })
        .collect())
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)Size:?\s*(\d+(\.\d+)?\s*[KMG]B)").expect("size pattern is valid")
    })
}

/// Pulls an advertised file size out of link text
///
/// # Examples
///
/// ```
/// use page_harvest::crawler::parse_size;
///
/// assert_eq!(parse_size("Annual Report Size: 2.5MB"), Some("2.5MB".to_string()));
/// assert_eq!(parse_size("Annual Report"), None);
/// ```
pub fn parse_size(text: &str) -> Option<String> {
    size_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Renders pages and extracts their content records
pub struct ContentExtractor {
    renderer: Arc<dyn Renderer>,
    origin: Origin,
    classifier: SourceClassifier,
    options: ExtractOptions,
    render_timeout: Duration,
}

impl ContentExtractor {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        origin: Origin,
        classifier: SourceClassifier,
        options: ExtractOptions,
        render_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            origin,
            classifier,
            options,
            render_timeout,
        }
    }

    /// Renders `url` and extracts its records
    pub async fn extract(&self, url: &PageUrl) -> Result<Vec<ContentRecord>, HarvestError> {
        let html = render_bounded(self.renderer.as_ref(), url.as_str(), self.render_timeout).await?;
        let records = extract_records(&html, url, &self.origin, &self.classifier, &self.options)?;
        tracing::debug!("Extracted {} records from {}", records.len(), url);
        Ok(records)
    }
}
