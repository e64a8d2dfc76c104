//! SQLite storage, one table per task type.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params_from_iter, Connection, TransactionBehavior};
use tracing::debug;

use super::{Batch, PersistError, Sink};

/// How long a writer waits for another run's transaction to finish.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Inserts records into `<table>` of a local SQLite database.
///
/// Table creation and all inserts of a batch share one IMMEDIATE transaction,
/// so concurrent runs against the same file never interleave partial writes.
pub struct SqliteSink {
    db_path: PathBuf,
}

impl SqliteSink {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, PersistError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

fn create_table_sql(table: &str, columns: &[&str]) -> String {
    let columns: Vec<String> = columns.iter().map(|c| format!("{} TEXT", c)).collect();
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, columns.join(", "))
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    )
}

impl Sink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write(&self, batch: &Batch<'_>) -> Result<String, PersistError> {
        let table = batch.spec.table();
        let columns = batch.spec.schema();

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(&create_table_sql(table, columns), [])?;
        {
            let mut stmt = tx.prepare(&insert_sql(table, columns))?;
            for record in batch.records {
                stmt.execute(params_from_iter(
                    columns.iter().map(|column| record.get(column)),
                ))?;
            }
        }
        tx.commit()?;

        debug!(
            "Committed {} row(s) into {} at {}",
            batch.records.len(),
            table,
            self.db_path.display()
        );
        Ok(format!("{}:{}", self.db_path.display(), table))
    }
}
