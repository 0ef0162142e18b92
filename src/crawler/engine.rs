//! Crawl orchestration
//!
//! A run has two phases. Discovery renders the seed and builds the frontier.
//! Extraction then drains the frontier with a fixed pool of workers, each
//! claiming URLs in the shared visited set before extracting and saving them.

use crate::config::Config;
use crate::crawler::discover::LinkDiscoverer;
use crate::crawler::extract::{ContentExtractor, ExtractOptions};
use crate::crawler::renderer::Renderer;
use crate::output::{CrawlCounters, CrawlReport, Sink};
use crate::record::ContentRecord;
use crate::state::VisitedSet;
use crate::url::{sink_key, Origin, PageUrl};
use crate::HarvestError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Crawls one site and hands every page's records to a sink
///
/// All crawl state lives in the engine and the run that owns it, so several
/// engines can run side by side.
pub struct CrawlEngine {
    discoverer: LinkDiscoverer,
    extractor: Arc<ContentExtractor>,
    sink: Arc<dyn Sink>,
    origin: Origin,
    workers: usize,
    max_retries: u32,
    retry_backoff: Duration,
}

impl CrawlEngine {
    /// Creates an engine from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to run
    /// * `Err(HarvestError)` - The configured origin is not a usable URL
    pub fn new(
        config: &Config,
        renderer: Arc<dyn Renderer>,
        sink: Arc<dyn Sink>,
    ) -> Result<Self, HarvestError> {
        let origin = Origin::parse(&config.site.origin)?;
        let render_timeout = config.renderer.page_timeout();

        let discoverer = LinkDiscoverer::new(
            Arc::clone(&renderer),
            origin.clone(),
            config.crawler.max_depth,
            render_timeout,
        );
        let extractor = ContentExtractor::new(
            renderer,
            origin.clone(),
            config.classifier(),
            ExtractOptions::for_schema(&config.extraction, config.output.schema),
            render_timeout,
        );

        Ok(Self {
            discoverer,
            extractor: Arc::new(extractor),
            sink,
            origin,
            workers: config.crawler.workers.max(1) as usize,
            max_retries: config.crawler.max_retries,
            retry_backoff: config.crawler.retry_backoff(),
        })
    }

    /// Runs discovery from `seed`, then extracts every discovered page
    ///
    /// Per-page failures are logged and counted; only a failure to render
    /// the seed aborts the run. When `cancel` fires, workers stop taking new
    /// pages and abandon in-flight extractions without writing them.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Counts for the run, including cancelled runs
    /// * `Err(HarvestError)` - Seed render failure, worker panic, or the sink
    ///   could not be finalized
    pub async fn run(
        &self,
        seed: &str,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, HarvestError> {
        let started = Instant::now();
        let counters = Arc::new(CrawlCounters::new());

        tracing::info!("Discovering pages from {}", seed);
        let frontier = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!("Cancelled during discovery");
                self.close_sink(RunEnd::Interrupted).await?;
                return Ok(counters.report(0, true, started.elapsed()));
            }
            frontier = self.discoverer.discover(seed) => frontier,
        };

        let frontier = match frontier {
            Ok(frontier) => frontier,
            Err(e) => {
                self.abandon_sink().await;
                return Err(e.into());
            }
        };

        let discovered = frontier.len();
        let shared = Arc::new(RunState {
            urls: frontier.into_vec(),
            cursor: AtomicUsize::new(0),
            visited: VisitedSet::new(),
            counters: Arc::clone(&counters),
            extractor: Arc::clone(&self.extractor),
            sink: Arc::clone(&self.sink),
            origin: self.origin.clone(),
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
        });

        let pool_size = self.workers.min(discovered).max(1);
        tracing::debug!("Extracting {} pages with {} workers", discovered, pool_size);

        let mut workers = JoinSet::new();
        for id in 0..pool_size {
            let worker = Worker {
                id,
                shared: Arc::clone(&shared),
                cancel: cancel.clone(),
            };
            workers.spawn(worker.run());
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                workers.abort_all();
                self.abandon_sink().await;
                return Err(e.into());
            }
        }

        let cancelled = cancel.is_cancelled();
        let end = if cancelled {
            RunEnd::Interrupted
        } else {
            RunEnd::Finished
        };
        self.close_sink(end).await?;

        let report = counters.report(discovered, cancelled, started.elapsed());
        tracing::info!(
            "Harvest finished: {} saved, {} failed, {} records",
            report.saved,
            report.failed,
            report.records
        );
        Ok(report)
    }

    async fn close_sink(&self, end: RunEnd) -> Result<(), HarvestError> {
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || match end {
            RunEnd::Finished => sink.finish(),
            RunEnd::Interrupted => sink.interrupt(),
            RunEnd::Failed => sink.fail(),
        })
        .await??;
        Ok(())
    }

    /// Marks the sink's run as failed; the caller reports the original error
    async fn abandon_sink(&self) {
        if let Err(e) = self.close_sink(RunEnd::Failed).await {
            tracing::warn!("Could not close output after failed run: {}", e);
        }
    }
}

/// How a run ended, as reported to the sink
#[derive(Debug, Clone, Copy)]
enum RunEnd {
    Finished,
    Interrupted,
    Failed,
}

/// State shared by the workers of one run
struct RunState {
    urls: Vec<PageUrl>,
    cursor: AtomicUsize,
    visited: VisitedSet,
    counters: Arc<CrawlCounters>,
    extractor: Arc<ContentExtractor>,
    sink: Arc<dyn Sink>,
    origin: Origin,
    max_retries: u32,
    retry_backoff: Duration,
}

impl RunState {
    /// Takes the next unprocessed frontier URL
    fn next_url(&self) -> Option<&PageUrl> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.urls.get(index)
    }
}

struct Worker {
    id: usize,
    shared: Arc<RunState>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        while !self.cancel.is_cancelled() {
            let Some(url) = self.shared.next_url() else {
                break;
            };

            if !self.shared.visited.claim(url) {
                continue;
            }
            self.shared.counters.page_visited();
            tracing::info!("Scraping: {}", url);

            let extracted = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Worker {} abandoned {}", self.id, url);
                    break;
                }
                extracted = self.extract_with_retry(url) => extracted,
            };

            if self.cancel.is_cancelled() {
                tracing::debug!("Worker {} dropped records of {}", self.id, url);
                break;
            }

            let outcome = match extracted {
                Ok(records) if records.is_empty() => {
                    tracing::debug!("No records on {}", url);
                    Ok(())
                }
                Ok(records) => self.save(url, records).await,
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                tracing::warn!("Error scraping {}: {}", url, e);
                self.shared.counters.page_failed();
            }
        }

        tracing::trace!("Worker {} stopped", self.id);
    }

    /// Extracts a page, retrying render failures with exponential backoff
    async fn extract_with_retry(&self, url: &PageUrl) -> Result<Vec<ContentRecord>, HarvestError> {
        let mut attempt = 0;
        loop {
            match self.shared.extractor.extract(url).await {
                Err(HarvestError::Render(e)) if attempt < self.shared.max_retries => {
                    let delay = self
                        .shared
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    tracing::debug!("Retrying {} in {:?} after: {}", url, delay, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn save(&self, url: &PageUrl, records: Vec<ContentRecord>) -> Result<(), HarvestError> {
        let key = sink_key(url.as_str(), &self.shared.origin);
        let count = records.len();

        let sink = Arc::clone(&self.shared.sink);
        let write_key = key.clone();
        tokio::task::spawn_blocking(move || sink.write(&write_key, &records)).await??;

        self.shared.counters.page_saved(count);
        tracing::info!("Saved: {}", key);
        Ok(())
    }
}
