//! Page fetching and per-task extraction.

mod extract;
mod http_client;
mod rotation;
mod tasks;

pub use extract::{extract, extract_named};
pub use http_client::{
    AttemptError, FetchError, Fetcher, HttpPageSource, PageSource, DEFAULT_USER_AGENTS,
};
pub use rotation::{RandomRotation, RotationChoice, RotationSource, SequenceRotation};
pub use tasks::{task_spec, TaskSpec};
