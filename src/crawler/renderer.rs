//! Page rendering
//!
//! This module defines the `Renderer` seam and its implementations:
//! - `HttpRenderer`: plain HTTP GET with a per-call timeout
//! - `SettledRenderer`: re-renders until the page stops changing
//!
//! A headless-browser renderer can be plugged in by implementing `Renderer`.

use crate::config::RendererConfig;
use crate::RenderError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;

/// Turns a URL into fully rendered HTML
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders `url`, giving up after `timeout`
    async fn render(&self, url: &str, timeout: Duration) -> Result<String, RenderError>;
}

/// Renders through `renderer`, enforcing `timeout` even if the renderer ignores it
pub async fn render_bounded(
    renderer: &dyn Renderer,
    url: &str,
    timeout: Duration,
) -> Result<String, RenderError> {
    match tokio::time::timeout(timeout, renderer.render(url, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout {
            url: url.to_string(),
            timeout,
        }),
    }
}

/// Renderer backed by a plain HTTP client
///
/// Returns the response body as served; client-side scripts are not run.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Builds the renderer's HTTP client
    ///
    /// # Example
    ///
    /// ```
    /// use page_harvest::config::RendererConfig;
    /// use page_harvest::crawler::HttpRenderer;
    ///
    /// let renderer = HttpRenderer::new(&RendererConfig::default()).unwrap();
    /// ```
    pub fn new(config: &RendererConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.render_timeout())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<String, RenderError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                cause: format!("HTTP {}", status.as_u16()),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(url, timeout, e))
    }
}

/// Maps a client error onto the render error taxonomy
fn classify_error(url: &str, timeout: Duration, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else if error.is_connect() {
        RenderError::Network {
            url: url.to_string(),
            cause: "Connection refused".to_string(),
        }
    } else if error.is_builder() || error.is_redirect() {
        RenderError::Navigation {
            url: url.to_string(),
            cause: error.to_string(),
        }
    } else {
        RenderError::Network {
            url: url.to_string(),
            cause: error.to_string(),
        }
    }
}

/// Waits for client-side content to settle before returning HTML
///
/// Renders repeatedly at `poll` intervals until two consecutive snapshots
/// match or `settle_timeout` has elapsed, then returns the latest snapshot.
/// The call's `timeout` covers every snapshot, so callers should budget for
/// the settle time on top of a single render. A failed re-render fails the
/// whole call.
pub struct SettledRenderer<R> {
    inner: R,
    poll: Duration,
    settle_timeout: Duration,
}

impl<R: Renderer> SettledRenderer<R> {
    pub fn new(inner: R, poll: Duration, settle_timeout: Duration) -> Self {
        Self {
            inner,
            poll,
            settle_timeout,
        }
    }
}

#[async_trait]
impl<R: Renderer> Renderer for SettledRenderer<R> {
    async fn render(&self, url: &str, timeout: Duration) -> Result<String, RenderError> {
        let started = Instant::now();
        let deadline = started + self.settle_timeout;
        let mut current = self.inner.render(url, timeout).await?;

        loop {
            if Instant::now() + self.poll > deadline {
                tracing::debug!("{} did not settle within {:?}", url, self.settle_timeout);
                return Ok(current);
            }

            tokio::time::sleep(self.poll).await;
            let remaining = timeout.saturating_sub(started.elapsed());
            let next = self.inner.render(url, remaining).await?;

            if next == current {
                return Ok(next);
            }
            current = next;
        }
    }
}
