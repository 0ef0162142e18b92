//! Crawl statistics
//!
//! Counters shared by crawl workers and the report produced from them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Running counters updated by crawl workers
#[derive(Debug, Default)]
pub struct CrawlCounters {
    visited: AtomicU64,
    saved: AtomicU64,
    failed: AtomicU64,
    records: AtomicU64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// A worker claimed a page for extraction
    pub fn page_visited(&self) {
        self.visited.fetch_add(1, Ordering::Relaxed);
    }

    /// A page's records reached the sink
    pub fn page_saved(&self, records: usize) {
        self.saved.fetch_add(1, Ordering::Relaxed);
        self.records.fetch_add(records as u64, Ordering::Relaxed);
    }

    /// Extraction or persistence failed for a page
    pub fn page_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a report
    pub fn report(&self, discovered: usize, cancelled: bool, elapsed: Duration) -> CrawlReport {
        CrawlReport {
            discovered: discovered as u64,
            visited: self.visited.load(Ordering::Relaxed),
            saved: self.saved.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            cancelled,
            elapsed,
        }
    }
}

/// Outcome of a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages in the frontier
    pub discovered: u64,

    /// Pages claimed for extraction
    pub visited: u64,

    /// Pages whose records were written
    pub saved: u64,

    /// Pages that failed to render, parse or persist
    pub failed: u64,

    /// Total records written
    pub records: u64,

    /// Whether the run was cut short by cancellation
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl CrawlReport {
    /// Visited pages that produced no records
    pub fn empty(&self) -> u64 {
        self.visited.saturating_sub(self.saved + self.failed)
    }

    /// Share of visited pages that were saved, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.visited == 0 {
            return 0.0;
        }
        (self.saved as f64 / self.visited as f64) * 100.0
    }
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Summary ===\n");

    println!("Pages:");
    println!("  Discovered: {}", report.discovered);
    println!("  Visited: {}", report.visited);
    println!("  Saved: {}", report.saved);
    println!("  Empty: {}", report.empty());
    println!("  Failed: {}", report.failed);
    println!();

    println!("Records written: {}", report.records);
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    if report.cancelled {
        println!("\nRun was cancelled before the frontier was exhausted");
    }

    println!(
        "\nSuccess Rate: {:.1}% ({} / {} pages saved)",
        report.success_rate(),
        report.saved,
        report.visited
    );
}
