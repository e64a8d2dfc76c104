//! Comma-separated export.

use std::fs;
use std::path::{Path, PathBuf};

use super::{export_path, Batch, PersistError, Sink};

/// Writes `<task>_data_<stamp>.csv` into a directory.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl Sink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, batch: &Batch<'_>) -> Result<String, PersistError> {
        let Some(first) = batch.records.first() else {
            return Ok("no rows".to_string());
        };

        fs::create_dir_all(&self.dir)?;
        let path = export_path(&self.dir, batch.spec.task_type(), batch.stamp, "csv");

        // All records of a task type share the first record's field set
        let header: Vec<&str> = first.field_names().collect();
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&header)?;
        for record in batch.records {
            writer.write_record(header.iter().map(|field| record.get(field).unwrap_or("")))?;
        }
        writer.flush()?;

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, TaskType};
    use crate::scrapers::task_spec;
    use tempfile::tempdir;

    #[test]
    fn test_csv_header_rows_and_quoting() {
        let dir = tempdir().unwrap();
        let records = vec![
            Record::new()
                .with("title", Some("Stocks, bonds and \"gold\"".to_string()))
                .with("link", Some("/a".to_string())),
            Record::new()
                .with("title", Some("No Title".to_string()))
                .with("link", None),
        ];
        let batch = Batch {
            spec: task_spec(TaskType::News),
            records: &records,
            stamp: "20240101_000000",
        };

        let path = CsvSink::new(dir.path()).write(&batch).unwrap();
        assert!(path.ends_with("news_data_20240101_000000.csv"));

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "title,link\n\"Stocks, bonds and \"\"gold\"\"\",/a\nNo Title,\n"
        );
    }

    #[test]
    fn test_csv_creates_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("exports").join("today");
        let records = vec![Record::new().with("song", Some("Song A".to_string()))];
        let batch = Batch {
            spec: task_spec(TaskType::Music),
            records: &records,
            stamp: "20240101_000000",
        };

        CsvSink::new(&nested).write(&batch).unwrap();
        assert!(nested.join("music_data_20240101_000000.csv").is_file());
    }
}
