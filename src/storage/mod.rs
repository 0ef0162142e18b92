//! Storage module for persisting harvest runs in SQLite
//!
//! This module handles:
//! - SQLite database initialization and schema management
//! - Run tracking (start, completion, interruption, failure)
//! - Record persistence through the `Sink` trait

mod schema;
mod sqlite;

pub use sqlite::SqliteSink;

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// A stored content record as read back from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub sink_key: String,
    pub page_title: String,
    pub page_url: String,
    pub source_type: String,
    pub section_type: String,
    pub content_label: String,
    pub source_url: Option<String>,
    pub notes: Option<String>,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
