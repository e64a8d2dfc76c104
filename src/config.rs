//! Configuration management for taskcrawl.
//!
//! Settings come from an optional TOML file. Every section has defaults, so a
//! missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TaskType;
use crate::scrapers::{task_spec, DEFAULT_USER_AGENTS};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TASKCRAWL_CONFIG";

/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "taskcrawl.toml";

/// Errors that stop a run before the pipeline starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no URL available for task type '{0}'")]
    NoUrl(TaskType),
    #[error("depth must be at least 1, got {0}")]
    InvalidDepth(u32),
    #[error("user agent pool is empty")]
    EmptyUserAgentPool,
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fetch: FetchSettings,
    pub rotation: RotationSettings,
    pub output: OutputSettings,
    pub urls: UrlSettings,
}

/// Request timeout and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    /// Fixed delay between attempts.
    pub retry_delay_secs: u64,
    /// Total attempts per fetch.
    pub max_retries: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retry_delay_secs: 2,
            max_retries: 3,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Proxy and user-agent pools sampled per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// Proxy URLs (`http://`, `https://` or `socks5://`). Empty means direct connections.
    pub proxies: Vec<String>,
    pub user_agents: Vec<String>,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            proxies: Vec::new(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Where results and logs are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for the CSV and JSON exports.
    pub dir: PathBuf,
    pub database: PathBuf,
    pub log_file: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            database: PathBuf::from("crawler_data.db"),
            log_file: PathBuf::from("crawler.log"),
        }
    }
}

/// Per task type URL overrides. An empty string disables the default URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlSettings {
    #[serde(alias = "public_opinion", skip_serializing_if = "Option::is_none")]
    pub news: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn: Option<String>,
}

impl UrlSettings {
    fn configured(&self, task_type: TaskType) -> Option<&str> {
        match task_type {
            TaskType::News => self.news.as_deref(),
            TaskType::Books => self.books.as_deref(),
            TaskType::Music => self.music.as_deref(),
            TaskType::Movies => self.movies.as_deref(),
            TaskType::Vpn => self.vpn.as_deref(),
        }
    }

    /// Default URL for a task type: the configured override, else the built-in one.
    pub fn default_for(&self, task_type: TaskType) -> Option<&str> {
        let url = self
            .configured(task_type)
            .unwrap_or_else(|| task_spec(task_type).default_url());
        let url = url.trim();
        (!url.is_empty()).then_some(url)
    }
}

impl Settings {
    /// Load settings from an explicit path, `$TASKCRAWL_CONFIG`, or
    /// `taskcrawl.toml` in the working directory. Falls back to defaults when
    /// no file is found. An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Self::from_file(Path::new(&path));
            }
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
