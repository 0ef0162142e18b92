//! Link discovery
//!
//! Renders the seed page and collects its same-origin links into the
//! frontier. With a hop depth above one, each newly found page is rendered in
//! turn and its links are added breadth-first.

use crate::crawler::parser::extract_page_links;
use crate::crawler::renderer::{render_bounded, Renderer};
use crate::state::Frontier;
use crate::url::{Origin, PageUrl};
use crate::RenderError;
use std::sync::Arc;
use std::time::Duration;

/// Builds the crawl frontier from a seed page
pub struct LinkDiscoverer {
    renderer: Arc<dyn Renderer>,
    origin: Origin,
    max_depth: u32,
    render_timeout: Duration,
}

impl LinkDiscoverer {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        origin: Origin,
        max_depth: u32,
        render_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            origin,
            max_depth,
            render_timeout,
        }
    }

    /// Discovers same-origin pages reachable from `seed`
    ///
    /// Depth 1 returns the seed page's own links. The seed is only included
    /// if some page links to it.
    ///
    /// # Returns
    ///
    /// * `Ok(Frontier)` - Deduplicated URLs in first-seen order
    /// * `Err(RenderError)` - The seed page could not be rendered
    pub async fn discover(&self, seed: &str) -> Result<Frontier, RenderError> {
        let html = render_bounded(self.renderer.as_ref(), seed, self.render_timeout).await?;

        let mut frontier = Frontier::new();
        let mut level = self.absorb(&mut frontier, &html, seed);
        tracing::debug!("Seed {} links to {} new pages", seed, level.len());

        for depth in 2..=self.max_depth {
            if level.is_empty() {
                break;
            }

            let mut next = Vec::new();
            for url in &level {
                match render_bounded(self.renderer.as_ref(), url.as_str(), self.render_timeout)
                    .await
                {
                    Ok(html) => next.extend(self.absorb(&mut frontier, &html, url.as_str())),
                    Err(e) => tracing::warn!("Skipping links of {} at depth {}: {}", url, depth, e),
                }
            }

            tracing::debug!("Depth {} added {} new pages", depth, next.len());
            level = next;
        }

        tracing::info!("Found {} internal pages", frontier.len());
        Ok(frontier)
    }

    /// Adds a page's links to the frontier, returning the ones that were new
    fn absorb(&self, frontier: &mut Frontier, html: &str, page_url: &str) -> Vec<PageUrl> {
        let links = match extract_page_links(html, &self.origin, page_url) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Failed to parse links on {}: {}", page_url, e);
                return Vec::new();
            }
        };

        links
            .into_iter()
            .filter(|link| frontier.push(link.clone()))
            .collect()
    }
}
