//! Row- and dataset-level issues collected while ingesting a dataset.
//!
//! Issues are data, not `Err` values: the ingestor and reconciler keep going
//! after recording one, and the job coordinator decides from the fatal ones
//! whether a job failed.

use crate::dataset::TableKind;
use crate::error::MaveError;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    ParseError,
    PrefixError,
    OverlapError,
    OutOfBoundsError,
    ReferenceMismatchError,
    TranslationError,
    DuplicateKeyError,
    MalformedRowError,
    OrphanCountsKeyError,
    SchemaError,
    EmptyDatasetError,
    KeyColumnMismatch,
    InvalidTarget,
    InternalError,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::ParseError => "ParseError",
            IssueCode::PrefixError => "PrefixError",
            IssueCode::OverlapError => "OverlapError",
            IssueCode::OutOfBoundsError => "OutOfBoundsError",
            IssueCode::ReferenceMismatchError => "ReferenceMismatchError",
            IssueCode::TranslationError => "TranslationError",
            IssueCode::DuplicateKeyError => "DuplicateKeyError",
            IssueCode::MalformedRowError => "MalformedRowError",
            IssueCode::OrphanCountsKeyError => "OrphanCountsKeyError",
            IssueCode::SchemaError => "SchemaError",
            IssueCode::EmptyDatasetError => "EmptyDatasetError",
            IssueCode::KeyColumnMismatch => "KeyColumnMismatch",
            IssueCode::InvalidTarget => "InvalidTarget",
            IssueCode::InternalError => "InternalError",
        }
    }

    /// Row-local codes: the row is dropped and ingestion continues.
    pub fn is_row_local(&self) -> bool {
        matches!(
            self,
            IssueCode::ParseError
                | IssueCode::PrefixError
                | IssueCode::OverlapError
                | IssueCode::OutOfBoundsError
                | IssueCode::ReferenceMismatchError
                | IssueCode::TranslationError
                | IssueCode::DuplicateKeyError
                | IssueCode::MalformedRowError
        )
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the error/warning report.
///
/// `row_number` is the 1-based physical line of the offending file, or 0 for
/// issues that concern a whole table or dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub row_number: usize,
    pub table: Option<TableKind>,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn row(
        table: TableKind,
        row_number: usize,
        code: IssueCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_number,
            table: Some(table),
            code,
            message: message.into(),
        }
    }

    pub fn dataset(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            row_number: 0,
            table: None,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(table) if self.row_number > 0 => write!(
                f,
                "{table} line {}: {}: {}",
                self.row_number, self.code, self.message
            ),
            Some(table) => write!(f, "{table}: {}: {}", self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl From<&MaveError> for Issue {
    fn from(err: &MaveError) -> Self {
        let message = err.to_string();
        match err {
            MaveError::Schema { table, msg } => Self {
                row_number: 0,
                table: Some(*table),
                code: IssueCode::SchemaError,
                message: msg.clone(),
            },
            MaveError::CsvParse { table, .. } => Self {
                row_number: 0,
                table: Some(*table),
                code: IssueCode::SchemaError,
                message,
            },
            MaveError::Io(_) => Issue::dataset(IssueCode::SchemaError, message),
            MaveError::InvalidChar { .. } | MaveError::EmptyTarget => {
                Issue::dataset(IssueCode::InvalidTarget, message)
            }
            MaveError::EmptyDataset => Issue::dataset(IssueCode::EmptyDatasetError, message),
            MaveError::KeyColumnMismatch { .. } => {
                Issue::dataset(IssueCode::KeyColumnMismatch, message)
            }
            MaveError::Config(_) | MaveError::WorkerPool(_) | MaveError::UnknownJob(_) => {
                Issue::dataset(IssueCode::InternalError, message)
            }
        }
    }
}

/// A per-row problem found by the table ingestor.
pub type RowError = Issue;

/// A cross-table problem found by the dataset reconciler.
pub type ConflictError = Issue;
