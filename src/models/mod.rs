//! Data models for taskcrawl.

mod record;
mod task;

pub use record::{Record, RecordSet};
pub use task::{Task, TaskType};
