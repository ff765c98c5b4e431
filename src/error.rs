// Error taxonomy shared by the store, renderer and sync layers

use std::path::PathBuf;
use thiserror::Error;

/// Why a spreadsheet row could not become a [`crate::StudentRecord`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing registration number")]
    MissingRegNo,

    #[error("{reg_no}: field '{field}' is not a number: '{value}'")]
    InvalidAmount {
        reg_no: String,
        field: String,
        value: String,
    },

    #[error("{reg_no}: Total Payable minus Total Paid is out of range")]
    AmountOutOfRange { reg_no: String },

    #[error("row has {found} cells but the sheet has {expected} columns")]
    RaggedRow { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum BillingError {
    /// No student with this registration number in the store
    #[error("no student with registration number '{0}'")]
    NotFound(String),

    #[error("invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("spreadsheet error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("remote sync failed: {0}")]
    Sync(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BillingError>;
