use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::warning::ExtractWarning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedCell {
    pub row_index: i64,
    pub column_index: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub page_index: usize,
}

impl RecognizedCell {
    #[must_use]
    pub fn new(row_index: i64, column_index: i64, text: impl Into<String>) -> Self {
        Self {
            row_index,
            column_index,
            text: text.into(),
            page_index: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedTable {
    #[serde(default)]
    pub cells: Vec<RecognizedCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedPage {
    #[serde(default)]
    pub tables: Vec<RecognizedTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedDocument {
    #[serde(default)]
    pub pages: Vec<RecognizedPage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub page: usize,
    pub table: usize,
    pub row: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Date(NaiveDate),
    Integer(u64),
    Text(String),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Integer(value) => serializer.serialize_u64(*value),
            Self::Date(_) | Self::Text(_) => serializer.collect_str(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThroughputRecord {
    pub schema: String,
    pub page: usize,
    pub table: usize,
    pub row: usize,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ThroughputRecord {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self.fields.get("date") {
            Some(FieldValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    #[must_use]
    pub fn hour(&self) -> Option<u64> {
        match self.fields.get("hour") {
            Some(FieldValue::Integer(hour)) => Some(*hour),
            _ => None,
        }
    }

    #[must_use]
    pub fn checkpoint(&self) -> Option<&str> {
        match self.fields.get("checkpoint") {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn count(&self) -> Option<u64> {
        match self.fields.get("count") {
            Some(FieldValue::Integer(count)) => Some(*count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub records: Vec<ThroughputRecord>,
    pub warnings: Vec<ExtractWarning>,
}
