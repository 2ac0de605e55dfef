use crate::constants::{
    CATEGORY_HEADER, CITY_HEADER, DESCRIPTION_HEADER, IMAGE_HEADER, PUBLISHER_NAME_HEADER,
    PUBLISHER_PHONE_HEADER, TIMESTAMP_HEADER, TITLE_HEADER,
};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

/// One unprocessed row from the source table, keyed by header text.
///
/// The field set comes from the sheet's header row at fetch time, so this is
/// a string map rather than a struct. Keys keep column order and serialize
/// as a flat JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(IndexMap<String, String>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Value of `field`, or the empty string when the column is absent
    pub fn field(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A record that survived validation, dedupe and media gating, with its
/// phone number masked. Only the feed pipeline constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProcessedRecord(RawRecord);

impl ProcessedRecord {
    pub(crate) fn from_redacted(record: RawRecord) -> Self {
        Self(record)
    }

    pub fn field(&self, field: &str) -> &str {
        self.0.field(field)
    }
}

/// Header text for each logical field the pipeline and the feed consumer rely on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub timestamp: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub category: String,
    pub image: String,
    pub publisher_name: String,
    pub publisher_phone: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            timestamp: TIMESTAMP_HEADER.to_string(),
            title: TITLE_HEADER.to_string(),
            description: DESCRIPTION_HEADER.to_string(),
            city: CITY_HEADER.to_string(),
            category: CATEGORY_HEADER.to_string(),
            image: IMAGE_HEADER.to_string(),
            publisher_name: PUBLISHER_NAME_HEADER.to_string(),
            publisher_phone: PUBLISHER_PHONE_HEADER.to_string(),
        }
    }
}

impl FieldNames {
    pub fn all(&self) -> [&str; 8] {
        [
            self.timestamp.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.city.as_str(),
            self.category.as_str(),
            self.image.as_str(),
            self.publisher_name.as_str(),
            self.publisher_phone.as_str(),
        ]
    }

    /// Expected headers that `record` does not carry
    pub fn missing_from<'a>(&'a self, record: &RawRecord) -> Vec<&'a str> {
        self.all()
            .into_iter()
            .filter(|name| !record.contains(name))
            .collect()
    }
}

/// Result of one fetch from the raw source.
///
/// `Empty` and `Failed` both produce an empty batch for callers; they are
/// kept apart so logs and metrics can tell an empty sheet from an outage.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Records(Vec<RawRecord>),
    Empty,
    Failed(String),
}

impl FetchOutcome {
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            FetchOutcome::Records(records) => records,
            FetchOutcome::Empty | FetchOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}
