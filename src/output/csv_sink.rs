//! CSV sink
//!
//! Writes one CSV file per page into the output directory. Rows go to a
//! temporary file in the same directory which replaces the page's file only
//! once every row is written, so a failed write never leaves a partial file.

use crate::config::RecordSchema;
use crate::output::traits::Sink;
use crate::record::{ContentRecord, FULL_COLUMNS, TEXT_COLUMNS};
use crate::SinkResult;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes each page's records to `<dir>/<key>.csv`
///
/// With the text-only schema files are named `<key>_text.csv` and only
/// text-derived records are written.
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
    schema: RecordSchema,
}

impl CsvSink {
    /// Creates the sink, creating `directory` if it does not exist
    pub fn new(directory: impl Into<PathBuf>, schema: RecordSchema) -> SinkResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory, schema })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file a key's records are written to
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name = match self.schema {
            RecordSchema::Full => format!("{}.csv", key),
            RecordSchema::TextOnly => format!("{}_text.csv", key),
        };
        self.directory.join(file_name)
    }
}

impl Sink for CsvSink {
    fn write(&self, key: &str, records: &[ContentRecord]) -> SinkResult<()> {
        let path = self.path_for(key);
        let mut staged = NamedTempFile::new_in(&self.directory)?;

        let mut writer = csv::Writer::from_writer(staged.as_file_mut());
        match self.schema {
            RecordSchema::Full => {
                writer.write_record(FULL_COLUMNS)?;
                for record in records {
                    writer.write_record(record.full_row())?;
                }
            }
            RecordSchema::TextOnly => {
                writer.write_record(TEXT_COLUMNS)?;
                for record in records.iter().filter(|r| r.section_type.is_text()) {
                    writer.write_record(record.text_row())?;
                }
            }
        }

        writer.flush()?;
        drop(writer);

        staged.persist(&path).map_err(io::Error::from)?;
        tracing::debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}
