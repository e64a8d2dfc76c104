//! Stable removal of exact-duplicate records.

use std::collections::HashSet;

use crate::models::{Record, RecordSet};

/// Drop records whose field-value pairs exactly match an earlier record.
///
/// Field order within a record is ignored. The first occurrence of each
/// distinct record keeps its position.
pub fn dedupe(records: RecordSet) -> RecordSet {
    let mut seen = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        if seen.insert(identity_key(&record)) {
            unique.push(record);
        }
    }

    unique
}

fn identity_key(record: &Record) -> Vec<(&'static str, Option<String>)> {
    record
        .identity()
        .into_iter()
        .map(|(name, value)| (name, value.map(str::to_string)))
        .collect()
}
