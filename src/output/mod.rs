//! Output module for persisting harvested records and reporting on a run
//!
//! This module handles:
//! - The `Sink` trait every record destination implements
//! - Per-page CSV files
//! - Crawl counters and the final report

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::{print_report, CrawlCounters, CrawlReport};
pub use traits::Sink;
