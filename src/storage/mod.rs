//! Persistence of record sets to CSV, JSON and SQLite.
//!
//! Each sink is written independently: a failure in one is logged and
//! reported but never stops the others from being attempted.

mod csv_sink;
mod json_sink;
mod sqlite_sink;

pub use csv_sink::CsvSink;
pub use json_sink::JsonSink;
pub use sqlite_sink::SqliteSink;

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::{error, info};

use crate::config::OutputSettings;
use crate::models::{Record, TaskType};
use crate::scrapers::{task_spec, TaskSpec};

/// Timestamp format used in export file names.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Failure of a single sink.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// One run's worth of records handed to each sink.
pub struct Batch<'a> {
    pub spec: &'a dyn TaskSpec,
    pub records: &'a [Record],
    /// Generation timestamp shared by every file of the run.
    pub stamp: &'a str,
}

/// A persistence destination.
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Write the batch, returning a description of where it went.
    fn write(&self, batch: &Batch<'_>) -> Result<String, PersistError>;
}

/// Result of one sink write.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: &'static str,
    pub result: Result<String, PersistError>,
}

/// What happened when a record set was persisted.
#[derive(Debug)]
pub enum PersistReport {
    /// The record set was empty; nothing was written.
    NothingToPersist,
    Written(Vec<SinkOutcome>),
}

impl PersistReport {
    pub fn is_nothing_to_persist(&self) -> bool {
        matches!(self, Self::NothingToPersist)
    }

    pub fn outcomes(&self) -> &[SinkOutcome] {
        match self {
            Self::NothingToPersist => &[],
            Self::Written(outcomes) => outcomes.as_slice(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes().iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.outcomes().iter().filter(|o| o.result.is_err())
    }
}

/// Path of an export file: `<dir>/<task>_data_<stamp>.<extension>`.
pub fn export_path(dir: &Path, task_type: TaskType, stamp: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}_data_{}.{}", task_type.as_str(), stamp, extension))
}

/// Writes record sets to a list of sinks.
pub struct Persister {
    sinks: Vec<Box<dyn Sink>>,
}

impl Persister {
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// CSV and JSON files in `output_dir` plus the SQLite database at `database`.
    pub fn standard(output_dir: &Path, database: &Path) -> Self {
        Self::new(vec![
            Box::new(CsvSink::new(output_dir)),
            Box::new(JsonSink::new(output_dir)),
            Box::new(SqliteSink::new(database)),
        ])
    }

    pub fn from_settings(settings: &OutputSettings) -> Self {
        Self::standard(&settings.dir, &settings.database)
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Persist with the current local time as the file stamp.
    pub fn persist(&self, records: &[Record], task_type: TaskType) -> PersistReport {
        let stamp = Local::now().format(STAMP_FORMAT).to_string();
        self.persist_with_stamp(records, task_type, &stamp)
    }

    pub fn persist_with_stamp(
        &self,
        records: &[Record],
        task_type: TaskType,
        stamp: &str,
    ) -> PersistReport {
        if records.is_empty() {
            info!("Nothing to persist for task type {}", task_type);
            return PersistReport::NothingToPersist;
        }

        let batch = Batch {
            spec: task_spec(task_type),
            records,
            stamp,
        };

        let outcomes = self
            .sinks
            .iter()
            .map(|sink| {
                let result = sink.write(&batch);
                match &result {
                    Ok(destination) => info!(
                        "Saved {} {} record(s) to {} ({})",
                        records.len(),
                        task_type,
                        destination,
                        sink.name()
                    ),
                    Err(e) => error!(
                        "Failed to save {} records to {}: {}",
                        task_type,
                        sink.name(),
                        e
                    ),
                }
                SinkOutcome {
                    sink: sink.name(),
                    result,
                }
            })
            .collect();

        PersistReport::Written(outcomes)
    }
}
