//! Extracted records.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A loosely-typed record: ordered field names mapped to optional string values.
///
/// Field order follows the producing task's schema. A `None` value means the
/// field was looked for but not present on the page (e.g. a news article
/// without a link).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, Option<String>)>,
}

/// Records in extraction order.
pub type RecordSet = Vec<Record>;

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn with(mut self, name: &'static str, value: Option<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &'static str, value: Option<String>) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Value of a field. Returns `None` both for absent fields and null values.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| *n == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field-value pairs sorted by field name, independent of insertion order.
    pub fn identity(&self) -> Vec<(&'static str, Option<&str>)> {
        let mut pairs: Vec<_> = self
            .fields
            .iter()
            .map(|(n, v)| (*n, v.as_deref()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
