//! Optional record filtering applied after deduplication.

use std::fmt;

use thiserror::Error;

use crate::models::{Record, RecordSet};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid filter '{0}': expected FIELD=TEXT")]
pub struct ParseCriterionError(String);

/// Keep records whose `field` contains `needle` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub field: String,
    pub needle: String,
}

impl Criterion {
    /// Parse `FIELD=TEXT`.
    pub fn parse(s: &str) -> Result<Self, ParseCriterionError> {
        match s.split_once('=') {
            Some((field, needle)) if !field.trim().is_empty() => Ok(Self {
                field: field.trim().to_string(),
                needle: needle.to_string(),
            }),
            _ => Err(ParseCriterionError(s.to_string())),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .is_some_and(|value| value.to_lowercase().contains(&self.needle.to_lowercase()))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.needle)
    }
}

/// All criteria must match. With no criteria every record passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    criteria: Vec<Criterion>,
}

impl RecordFilter {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.criteria.iter().all(|c| c.matches(record))
    }

    pub fn apply(&self, records: RecordSet) -> RecordSet {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
