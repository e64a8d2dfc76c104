//! Pretty-printed JSON export.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::{export_path, Batch, PersistError, Sink};

/// Writes `<task>_data_<stamp>.json` (an array of objects, 4-space indent).
pub struct JsonSink {
    dir: PathBuf,
}

impl JsonSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl Sink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&self, batch: &Batch<'_>) -> Result<String, PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = export_path(&self.dir, batch.spec.task_type(), batch.stamp, "json");

        let mut writer = BufWriter::new(File::create(&path)?);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        batch.records.serialize(&mut serializer)?;
        writer.flush()?;

        Ok(path.display().to_string())
    }
}
