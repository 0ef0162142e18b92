//! SQLite sink implementation
//!
//! Every record of a run lands in one `records` table, tagged with the run
//! and the page's sink key.

use crate::output::Sink;
use crate::record::ContentRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::{RecordRow, RunRecord, RunStatus};
use crate::{SinkError, SinkResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed record sink
///
/// Opening the sink starts a new run row; [`Sink::finish`] completes it.
pub struct SqliteSink {
    conn: Mutex<Connection>,
    run_id: i64,
}

impl SqliteSink {
    /// Opens or creates the database at `path` and starts a run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration driving this run
    pub fn new(path: &Path, config_hash: &str) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::start(conn, config_hash)
    }

    /// Creates an in-memory database
    pub fn new_in_memory(config_hash: &str) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start(conn, config_hash)
    }

    fn start(conn: Connection, config_hash: &str) -> SinkResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![
                Utc::now().to_rfc3339(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started harvest run {}", run_id);

        Ok(Self {
            conn: Mutex::new(conn),
            run_id,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    fn lock(&self) -> SinkResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SinkError::Poisoned)
    }

    fn close_run(&self, status: RunStatus) -> SinkResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), Utc::now().to_rfc3339(), self.run_id],
        )?;
        tracing::debug!("Harvest run {} {}", self.run_id, status.to_db_string());
        Ok(())
    }

    /// Returns this sink's run row
    pub fn run(&self) -> SinkResult<Option<RunRecord>> {
        let conn = self.lock()?;
        let run = conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![self.run_id],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(RunStatus::Running),
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    /// Returns the records stored under `key` in this run, in insertion order
    pub fn records_for(&self, key: &str) -> SinkResult<Vec<RecordRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT sink_key, page_title, page_url, source_type, section_type,
                    content_label, source_url, notes
             FROM records WHERE run_id = ?1 AND sink_key = ?2 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![self.run_id, key], |row| {
                Ok(RecordRow {
                    sink_key: row.get(0)?,
                    page_title: row.get(1)?,
                    page_url: row.get(2)?,
                    source_type: row.get(3)?,
                    section_type: row.get(4)?,
                    content_label: row.get(5)?,
                    source_url: row.get(6)?,
                    notes: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Counts the records written in this run
    pub fn count_records(&self) -> SinkResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl Sink for SqliteSink {
    fn write(&self, key: &str, records: &[ContentRecord]) -> SinkResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // A key written twice in one run keeps only its latest record set
        tx.execute(
            "DELETE FROM records WHERE run_id = ?1 AND sink_key = ?2",
            params![self.run_id, key],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (run_id, sink_key, page_title, page_url, source_type,
                                      section_type, content_label, source_url, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            let now = Utc::now().to_rfc3339();
            for record in records {
                stmt.execute(params![
                    self.run_id,
                    key,
                    record.page_title,
                    record.page_url.as_str(),
                    record.source_type.as_str(),
                    record.section_type.as_str(),
                    record.content_label,
                    record.source_url.as_ref().map(|u| u.as_str()),
                    record.notes,
                    now,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn finish(&self) -> SinkResult<()> {
        self.close_run(RunStatus::Completed)
    }

    fn interrupt(&self) -> SinkResult<()> {
        self.close_run(RunStatus::Interrupted)
    }

    fn fail(&self) -> SinkResult<()> {
        self.close_run(RunStatus::Failed)
    }
}
