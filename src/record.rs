//! Content record definitions
//!
//! A [`ContentRecord`] is one row of harvested data: a single text block,
//! document link, or image found on a single page.

use crate::url::PageUrl;
use serde::Deserialize;
use std::fmt;

/// Column headers for the full record schema, in output order
pub const FULL_COLUMNS: [&str; 7] = [
    "Page Title",
    "Page URL",
    "Source Type",
    "Section Type",
    "Content/Label",
    "Source URL",
    "Notes",
];

/// Column headers for the text-only record schema, in output order
pub const TEXT_COLUMNS: [&str; 5] = [
    "Page Title",
    "Page URL",
    "Source Type",
    "Section Type",
    "Text Content",
];

/// Coarse subject category assigned to a page from its URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum TopicLabel {
    Forecast,
    Nowcast,
    Alerts,
    #[serde(rename = "Ocean Applications")]
    OceanApplications,
    Cyclone,
    Monsoon,
    Weather,
    Energy,
    Rainfall,
    Dataset,
    Archive,
    Announcement,
    Satellite,
    General,
}

impl TopicLabel {
    /// Returns the human-readable label written to output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forecast => "Forecast",
            Self::Nowcast => "Nowcast",
            Self::Alerts => "Alerts",
            Self::OceanApplications => "Ocean Applications",
            Self::Cyclone => "Cyclone",
            Self::Monsoon => "Monsoon",
            Self::Weather => "Weather",
            Self::Energy => "Energy",
            Self::Rainfall => "Rainfall",
            Self::Dataset => "Dataset",
            Self::Archive => "Archive",
            Self::Announcement => "Announcement",
            Self::Satellite => "Satellite",
            Self::General => "General",
        }
    }
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of page element a record was extracted from
///
/// `Text` is used by fine-grained text extraction; the heading, paragraph
/// and list-item kinds are used by coarse extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Text,
    H1,
    H2,
    H3,
    P,
    Li,
    Pdf,
    Image,
}

impl SectionType {
    /// Maps an HTML tag name to its coarse text section type
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "p" => Some(Self::P),
            "li" => Some(Self::Li),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::P => "P",
            Self::Li => "LI",
            Self::Pdf => "PDF",
            Self::Image => "Image",
        }
    }

    /// Returns true for every text-derived section type
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Pdf | Self::Image)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted row, tied to a single page and page element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub page_title: String,
    pub page_url: PageUrl,
    pub source_type: TopicLabel,
    pub section_type: SectionType,
    pub content_label: String,
    /// Set for PDF and image records
    pub source_url: Option<PageUrl>,
    /// Parsed document size for PDF records
    pub notes: Option<String>,
}

impl ContentRecord {
    /// Returns the row in full-schema column order
    pub fn full_row(&self) -> [&str; 7] {
        [
            self.page_title.as_str(),
            self.page_url.as_str(),
            self.source_type.as_str(),
            self.section_type.as_str(),
            self.content_label.as_str(),
            self.source_url.as_ref().map(PageUrl::as_str).unwrap_or(""),
            self.notes.as_deref().unwrap_or(""),
        ]
    }

    /// Returns the row in text-only column order
    pub fn text_row(&self) -> [&str; 5] {
        [
            self.page_title.as_str(),
            self.page_url.as_str(),
            self.source_type.as_str(),
            self.section_type.as_str(),
            self.content_label.as_str(),
        ]
    }
}
