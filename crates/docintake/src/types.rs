//! Result types produced by the extraction pipeline.
//!
//! One [`ExtractionResult`] is produced per input file. It owns plain data only,
//! so it can be handed across threads and serialized to JSON as-is.

use crate::error::{DocintakeError, ErrorKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A spreadsheet row: column name to cell value, in column order.
pub type RowRecord = IndexMap<String, CellValue>;

/// Workbook content: sheet name to rows, in workbook order.
pub type WorkbookContent = IndexMap<String, Vec<RowRecord>>;

/// Entity name to matched value(s), in registry order.
pub type StructuredData = IndexMap<String, EntityValue>;

/// Extraction outcome for a single file.
///
/// `error` is set if and only if `content` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub filename: String,
    /// Lowercased extension including the leading dot (`.pdf`), empty when absent.
    pub file_type: String,
    pub content: Option<Content>,
    #[serde(default)]
    pub structured_data: StructuredData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReport>,
}

impl ExtractionResult {
    pub(crate) fn new(filename: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_type: file_type.into(),
            content: None,
            structured_data: StructuredData::new(),
            error: None,
        }
    }

    pub(crate) fn fail(mut self, error: &DocintakeError) -> Self {
        self.content = None;
        self.structured_data.clear();
        self.error = Some(FailureReport::from(error));
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The text content, for text-bearing formats.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The sheets, for spreadsheets.
    pub fn workbook(&self) -> Option<&WorkbookContent> {
        match &self.content {
            Some(Content::Workbook(sheets)) => Some(sheets),
            _ => None,
        }
    }

    /// Lookup an entity by name.
    pub fn entity(&self, name: &str) -> Option<&EntityValue> {
        self.structured_data.get(name)
    }
}

/// Extracted payload: a text blob, or the sheets of a workbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Workbook(WorkbookContent),
}

/// Recorded failure for one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DocintakeError> for FailureReport {
    fn from(err: &DocintakeError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Scalar spreadsheet cell. Blank cells are always `Text("")`, never null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Matched value(s) for one entity.
///
/// An entity with no match is absent from [`StructuredData`] altogether; there is
/// no empty variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EntityValue {
    Single(String),
    Multiple(Vec<String>),
}

impl EntityValue {
    /// Build from matches in order of appearance. `None` when there are no matches.
    pub fn from_matches(mut matches: Vec<String>) -> Option<Self> {
        match matches.len() {
            0 => None,
            1 => matches.pop().map(Self::Single),
            _ => Some(Self::Multiple(matches)),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) => None,
        }
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => f.write_str(value),
            Self::Multiple(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}
