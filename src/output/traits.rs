//! Sink trait
//!
//! A sink persists the record set of one page under its sink key. Sinks are
//! shared by every crawl worker, so implementations must be thread-safe and
//! guard any mutable state themselves.

use crate::record::ContentRecord;
use crate::SinkResult;

/// Destination for extracted content records
///
/// Calls are blocking; the crawl engine runs them on the blocking thread pool.
pub trait Sink: Send + Sync {
    /// Persists all records of one page under `key`
    ///
    /// # Arguments
    ///
    /// * `key` - Filesystem-safe page key, see [`crate::url::sink_key`]
    /// * `records` - The page's records in extraction order; never empty
    fn write(&self, key: &str, records: &[ContentRecord]) -> SinkResult<()>;

    /// Finalizes the output once every worker has stopped
    fn finish(&self) -> SinkResult<()> {
        Ok(())
    }

    /// Finalizes the output of a cancelled run
    fn interrupt(&self) -> SinkResult<()> {
        self.finish()
    }

    /// Finalizes the output of a run that stopped on an error
    fn fail(&self) -> SinkResult<()> {
        self.interrupt()
    }
}
