//! Clean a sales CSV export and load it into a typed Postgres table.
//!
//! The pipeline has two stages that only share a file path and the
//! canonical schema in [`schema::SALES_SCHEMA`]:
//!
//! - [`cleaner::clean`] parses day-first dates, fills missing postal codes
//!   with 0, drops exact duplicate rows and writes a cleaned CSV.
//! - [`loader::load`] maps the cleaned columns by name onto the
//!   `sales_data` table and inserts every row in one transaction.
pub mod cleaner;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod output;
pub mod schema;
pub mod types;
pub mod util;

pub use error::{CleanError, EtlError, LoadError};
