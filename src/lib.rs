//! taskcrawl - single-page task crawler.
//!
//! Fetches one page for a task type (news, books, music charts, movie charts
//! or VPN listings), extracts records with the task's selectors, removes
//! duplicates and writes the result to CSV, JSON and SQLite.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod storage;

pub use config::{ConfigError, Settings};
pub use models::{Record, RecordSet, Task, TaskType};
pub use pipeline::{dedupe, CrawlError, Crawler, RunOutcome};
pub use scrapers::{extract, FetchError, Fetcher};
pub use storage::{PersistError, PersistReport, Persister};
