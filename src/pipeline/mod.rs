//! The crawl pipeline: resolve, fetch, extract, dedupe, filter, persist.

mod dedupe;
mod filter;

pub use dedupe::dedupe;
pub use filter::{Criterion, ParseCriterionError, RecordFilter};

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{ConfigError, Settings, UrlSettings};
use crate::models::{Record, RecordSet, Task, TaskType};
use crate::scrapers::{task_spec, FetchError, Fetcher, RandomRotation};
use crate::storage::{PersistReport, Persister};

/// Pipeline stage of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Resolving,
    Fetching,
    Extracting,
    Deduplicating,
    Persisting,
    Done,
    NoData,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Deduplicating => "deduplicating",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::NoData => "no data",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A run that failed before producing records.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("persistence task failed: {0}")]
    Persist(#[from] tokio::task::JoinError),
}

/// How a successful run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Records were extracted and handed to the sinks. Individual sinks may
    /// still have failed; see the report.
    Completed {
        url: String,
        records: RecordSet,
        report: PersistReport,
    },
    /// The page was fetched but yielded no records.
    NoData { url: String },
}

impl RunOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Completed { url, .. } | Self::NoData { url } => url,
        }
    }

    pub fn records(&self) -> &[Record] {
        match self {
            Self::Completed { records, .. } => records.as_slice(),
            Self::NoData { .. } => &[],
        }
    }
}

/// Runs tasks through the pipeline.
pub struct Crawler {
    fetcher: Fetcher,
    persister: Arc<Persister>,
    urls: UrlSettings,
    max_retries: u32,
}

impl Crawler {
    pub fn new(fetcher: Fetcher, persister: Persister, urls: UrlSettings, max_retries: u32) -> Self {
        Self {
            fetcher,
            persister: Arc::new(persister),
            urls,
            max_retries,
        }
    }

    /// HTTP fetcher with random rotation and the standard three sinks.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let rotation = RandomRotation::from_settings(&settings.rotation)?;
        let fetcher = Fetcher::http(&settings.fetch, Arc::new(rotation));
        Ok(Self::new(
            fetcher,
            Persister::from_settings(&settings.output),
            settings.urls.clone(),
            settings.fetch.max_retries,
        ))
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Explicit task URL, else the task type's default.
    pub fn resolve_url(&self, task: &Task) -> Result<String, ConfigError> {
        if task.depth == 0 {
            return Err(ConfigError::InvalidDepth(task.depth));
        }
        if let Some(url) = task.target_url.as_deref() {
            if !url.trim().is_empty() {
                return Ok(url.trim().to_string());
            }
        }
        self.urls
            .default_for(task.task_type)
            .map(str::to_string)
            .ok_or(ConfigError::NoUrl(task.task_type))
    }

    fn enter(&self, task_type: TaskType, state: RunState) {
        debug!("[{}] {}", task_type, state);
    }

    /// Run one task to completion.
    pub async fn run(&self, task: &Task) -> Result<RunOutcome, CrawlError> {
        let task_type = task.task_type;
        let spec = task_spec(task_type);

        self.enter(task_type, RunState::Resolving);
        let url = match self.resolve_url(task) {
            Ok(url) => url,
            Err(e) => {
                error!("Cannot start {} task: {}", task_type, e);
                self.enter(task_type, RunState::Failed);
                return Err(e.into());
            }
        };
        info!("Starting crawl task: {} for URL: {}", task_type, url);
        if task.depth > 1 {
            info!(
                "Depth {} requested for {}; only the target page is fetched",
                task.depth, task_type
            );
        }

        self.enter(task_type, RunState::Fetching);
        let html = match self.fetcher.fetch(&url, self.max_retries).await {
            Ok(html) => html,
            Err(e) => {
                error!("Failed to fetch data for URL {}: {}", url, e);
                self.enter(task_type, RunState::Failed);
                return Err(e.into());
            }
        };

        self.enter(task_type, RunState::Extracting);
        let records = spec.extract(&html);
        drop(html);
        info!("Extracted {} {} record(s) from {}", records.len(), task_type, url);

        self.enter(task_type, RunState::Deduplicating);
        let extracted = records.len();
        let records = task.filter.apply(dedupe(records));
        if records.len() != extracted {
            info!(
                "Kept {} of {} {} record(s) after deduplication and filtering",
                records.len(),
                extracted,
                task_type
            );
        }

        if records.is_empty() {
            info!("No data found for task type {}", task_type);
            self.enter(task_type, RunState::NoData);
            return Ok(RunOutcome::NoData { url });
        }

        self.enter(task_type, RunState::Persisting);
        let persister = Arc::clone(&self.persister);
        let (records, report) = tokio::task::spawn_blocking(move || {
            let report = persister.persist(&records, task_type);
            (records, report)
        })
        .await?;

        self.enter(task_type, RunState::Done);
        Ok(RunOutcome::Completed {
            url,
            records,
            report,
        })
    }

    /// Run several tasks concurrently. Results come back in input order.
    pub async fn run_all(&self, tasks: &[Task]) -> Vec<(TaskType, Result<RunOutcome, CrawlError>)> {
        let runs = tasks.iter().map(|task| async move {
            let result = self.run(task).await;
            (task.task_type, result)
        });
        join_all(runs).await
    }
}
