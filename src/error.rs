// Error types for both pipeline stages.
//
// Cleaning failures are all "malformed input"; loading failures are all
// "load failure". The binary only needs to know which stage broke and why.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("input has unexpected columns: {}", .0.join(", "))]
    UnexpectedColumns(Vec<String>),

    #[error("row {row}: cannot parse {value:?} in `{column}` as a day-first date")]
    BadDate {
        row: u64,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: postal code {value:?} is not an integer")]
    BadPostalCode { row: u64, value: String },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("row {row}: value {value:?} in `{column}` is not a valid {expected}")]
    BadValue {
        row: u64,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("table \"{0}\" already exists")]
    TableExists(String),
}

/// Top-level error of a pipeline run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] CleanError),

    #[error("load failure: {0}")]
    LoadFailure(#[from] LoadError),
}
