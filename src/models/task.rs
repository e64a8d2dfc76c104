//! Task types and the immutable task value handed to the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::RecordFilter;

/// One of the fixed crawl targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// News headlines (stored as public opinion).
    #[serde(alias = "public_opinion")]
    #[value(alias = "public_opinion")]
    News,
    /// Book titles.
    Books,
    /// Music chart songs.
    Music,
    /// Movie chart titles.
    Movies,
    /// Public VPN relay listings.
    Vpn,
}

impl TaskType {
    /// Every task type, in display order.
    pub const ALL: [TaskType; 5] = [
        TaskType::News,
        TaskType::Books,
        TaskType::Music,
        TaskType::Movies,
        TaskType::Vpn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Books => "books",
            Self::Music => "music",
            Self::Movies => "movies",
            Self::Vpn => "vpn",
        }
    }

    /// Parse a task type name. `public_opinion` is accepted for news.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" | "public_opinion" => Some(Self::News),
            "books" => Some(Self::Books),
            "music" => Some(Self::Music),
            "movies" => Some(Self::Movies),
            "vpn" => Some(Self::Vpn),
            _ => None,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single crawl request.
///
/// `depth` is accepted for compatibility with the input form but never used
/// to follow links; exactly one page is fetched per task.
#[derive(Debug, Clone)]
pub struct Task {
    pub task_type: TaskType,
    pub target_url: Option<String>,
    pub depth: u32,
    pub filter: RecordFilter,
}

impl Task {
    /// Create a task using the task type's default URL.
    pub fn new(task_type: TaskType) -> Self {
        Self {
            task_type,
            target_url: None,
            depth: 1,
            filter: RecordFilter::default(),
        }
    }

    /// Override the target URL. Blank strings count as no override.
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.target_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }
}
