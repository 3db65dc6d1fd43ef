use std::io;

use thiserror::Error;

use crate::warning::ExtractWarning;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid recognized document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "cell index ({row}, {column}) on page {page} table {table} is negative; cannot build grid"
    )]
    MalformedCellIndex {
        page: usize,
        table: usize,
        row: i64,
        column: i64,
    },

    #[error(
        "cell index ({row}, {column}) on page {page} table {table} needs more than {limit} grid cells"
    )]
    GridTooLarge {
        page: usize,
        table: usize,
        row: usize,
        column: usize,
        limit: usize,
    },

    #[error("no known header in the first {lookahead} row(s) of page {page} table {table}")]
    SchemaNotRecognized {
        page: usize,
        table: usize,
        lookahead: usize,
    },

    #[error("extraction failed: {reason} ({count} warning(s))", count = .warnings.len())]
    ExtractionFailed {
        reason: String,
        warnings: Vec<ExtractWarning>,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("invalid header registry: {0}")]
    InvalidRegistry(String),
}

impl ExtractError {
    #[must_use]
    pub fn warnings(&self) -> &[ExtractWarning] {
        match self {
            Self::ExtractionFailed { warnings, .. } => warnings,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RowRejection {
    pub field: Option<String>,
    pub reason: String,
}

impl RowRejection {
    #[must_use]
    pub fn for_field(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            reason: reason.into(),
        }
    }
}
