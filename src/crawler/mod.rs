//! Crawler module for page discovery and content extraction
//!
//! This module contains the core harvesting logic, including:
//! - Page rendering behind the `Renderer` trait
//! - HTML parsing and same-origin link extraction
//! - Link discovery from the seed page
//! - Content extraction into records
//! - Overall crawl coordination with a worker pool

mod discover;
mod engine;
mod extract;
mod parser;
mod renderer;

pub use discover::LinkDiscoverer;
pub use engine::CrawlEngine;
pub use extract::{extract_records, parse_size, ContentExtractor, ExtractOptions};
pub use parser::{extract_page_links, UNTITLED_PAGE};
pub use renderer::{render_bounded, HttpRenderer, Renderer, SettledRenderer};

pub use crate::output::CrawlReport;
