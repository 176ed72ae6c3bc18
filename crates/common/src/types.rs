use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Int(i32),
    Long(i64),
    Str(String),
    Compound(Record),
}

impl Tag {
    /// Numeric value of an `Int` or `Long` tag, widened to `i64`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Tag::Int(v) => Some(i64::from(*v)),
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }
}

/// Compound persisted record: string keys mapped to tagged values.
///
/// Keys iterate in sorted order (BTreeMap), so encoded records are canonical
/// and hash identically across runs. Readers are lenient: asking for a
/// missing or mistyped numeric field yields `0` rather than an error, which
/// lets old records load into newer owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    tags: BTreeMap<String, Tag>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.tags.get(key)
    }

    /// Insert a tag, returning the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, tag: Tag) -> Option<Tag> {
        self.tags.insert(key.into(), tag)
    }

    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.tags.remove(key)
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i32) {
        self.insert(key, Tag::Int(value));
    }

    pub fn set_long(&mut self, key: impl Into<String>, value: i64) {
        self.insert(key, Tag::Long(value));
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Tag::Str(value.into()));
    }

    pub fn set_compound(&mut self, key: impl Into<String>, value: Record) {
        self.insert(key, Tag::Compound(value));
    }

    /// Numeric field as `i64`; `0` when absent or not numeric.
    pub fn get_long(&self, key: &str) -> i64 {
        self.tags.get(key).and_then(Tag::as_long).unwrap_or(0)
    }

    /// Numeric field saturated into `i32`; `0` when absent or not numeric.
    pub fn get_int(&self, key: &str) -> i32 {
        crate::narrow::saturate(self.get_long(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.tags.get(key) {
            Some(Tag::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_compound(&self, key: &str) -> Option<&Record> {
        match self.tags.get(key) {
            Some(Tag::Compound(r)) => Some(r),
            _ => None,
        }
    }

    /// Iterate tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }
}
