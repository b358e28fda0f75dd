use crate::dataset::TableKind;
use std::io;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MaveError {
    #[error("invalid character '{ch}' at position {pos} for a {expected} sequence")]
    InvalidChar {
        ch: char,
        pos: usize,
        expected: &'static str,
    },

    #[error("target sequence is empty")]
    EmptyTarget,

    #[error("{table} file: {msg}")]
    Schema { table: TableKind, msg: String },

    #[error("no variants could be parsed from the uploaded scores or counts files")]
    EmptyDataset,

    #[error("scores are keyed on '{scores}' but counts are keyed on '{counts}'")]
    KeyColumnMismatch {
        scores: &'static str,
        counts: &'static str,
    },

    #[error("csv parse error in {table} file: {source}")]
    CsvParse {
        table: TableKind,
        #[source]
        source: csv::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("unknown job {0}")]
    UnknownJob(Uuid),
}

impl MaveError {
    pub fn schema(table: TableKind, msg: impl Into<String>) -> Self {
        MaveError::Schema {
            table,
            msg: msg.into(),
        }
    }
}

pub type MaveResult<T> = Result<T, MaveError>;
