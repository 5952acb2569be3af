// Run configuration: file locations, destination table and load mode.
//
// Connection details are read from the environment only; nothing about the
// database is compiled into the binary.
use crate::error::LoadError;
use clap::ValueEnum;
use serde::Serialize;
use std::env;
use std::fmt;

pub const DEFAULT_INPUT: &str = "dataset.csv";
pub const DEFAULT_OUTPUT: &str = "cleaned_sales_data.csv";
pub const DEFAULT_TABLE: &str = "sales_data";

/// What to do when the destination table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Drop and recreate the table, then insert every row.
    #[default]
    Replace,
    /// Keep existing rows and insert after them. The existing table must
    /// have the canonical columns and types.
    Append,
    /// Refuse to touch a table that already exists.
    Fail,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoadMode::Replace => "replace",
            LoadMode::Append => "append",
            LoadMode::Fail => "fail",
        })
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub table: String,
    pub mode: LoadMode,
}

impl LoadOptions {
    pub fn new(table: impl Into<String>, mode: LoadMode) -> Result<Self, LoadError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { table, mode })
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            mode: LoadMode::Replace,
        }
    }
}

/// Table names are interpolated into DDL, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<(), LoadError> {
    let mut chars = name.chars();
    let valid = name.len() <= 63
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LoadError::Config(format!("invalid table name {:?}", name)))
    }
}

/// Resolve the connection string: an explicit value wins, then
/// `DATABASE_URL`, then `SALES_ETL_DATABASE_URL`.
pub fn database_url(explicit: Option<String>) -> Result<String, LoadError> {
    explicit
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env::var("DATABASE_URL").ok())
        .or_else(|| env::var("SALES_ETL_DATABASE_URL").ok())
        .ok_or_else(|| {
            LoadError::Config("DATABASE_URL (or SALES_ETL_DATABASE_URL) must be set".to_string())
        })
}
