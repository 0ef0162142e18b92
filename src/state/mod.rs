//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Frontier`: ordered, deduplicated list of pages found during discovery
//! - `VisitedSet`: pages already claimed by an extraction worker

mod frontier;
mod visited;

// Re-export main types
pub use frontier::Frontier;
pub use visited::VisitedSet;
