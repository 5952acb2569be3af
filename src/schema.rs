// The canonical sales schema shared by the cleaner and the loader.
//
// Each entry ties a CSV header to its database column and type, so the
// loader resolves columns by name and never by position.
use crate::util::{is_missing, parse_integral, parse_iso_date};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Date,
    Decimal,
}

impl ColumnType {
    /// Type used in `CREATE TABLE`.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Date => "DATE",
            ColumnType::Decimal => "NUMERIC",
        }
    }

    /// Name reported by `information_schema.columns.data_type`.
    pub fn catalog_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
            ColumnType::Decimal => "numeric",
        }
    }

    /// Coerce one CSV field into a typed cell. Blank fields become NULL.
    /// Returns `None` when the text is not a valid value of this type.
    pub fn coerce(self, raw: &str) -> Option<Cell> {
        let s = raw.trim();
        let blank = is_missing(s);
        match self {
            ColumnType::Text => Some(Cell::Text((!raw.is_empty()).then(|| raw.to_string()))),
            ColumnType::Integer if blank => Some(Cell::Integer(None)),
            ColumnType::Integer => parse_integral(s)
                .and_then(|v| i32::try_from(v).ok())
                .map(|v| Cell::Integer(Some(v))),
            ColumnType::Date if blank => Some(Cell::Date(None)),
            ColumnType::Date => parse_iso_date(s).map(|d| Cell::Date(Some(d))),
            ColumnType::Decimal if blank => Some(Cell::Decimal(None)),
            ColumnType::Decimal => match s.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(Cell::Decimal(Some(s.to_string()))),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Header in the raw and cleaned CSV files.
    pub source: &'static str,
    /// Column name in the database table.
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn col(source: &'static str, name: &'static str, ty: ColumnType) -> Column {
    Column { source, name, ty }
}

pub const SALES_SCHEMA: [Column; 18] = [
    col("Row ID", "row_id", ColumnType::Integer),
    col("Order ID", "order_id", ColumnType::Text),
    col("Order Date", "order_date", ColumnType::Date),
    col("Ship Date", "ship_date", ColumnType::Date),
    col("Ship Mode", "ship_mode", ColumnType::Text),
    col("Customer ID", "customer_id", ColumnType::Text),
    col("Customer Name", "customer_name", ColumnType::Text),
    col("Segment", "segment", ColumnType::Text),
    col("Country", "country", ColumnType::Text),
    col("City", "city", ColumnType::Text),
    col("State", "state", ColumnType::Text),
    col("Postal Code", "postal_code", ColumnType::Integer),
    col("Region", "region", ColumnType::Text),
    col("Product ID", "product_id", ColumnType::Text),
    col("Category", "category", ColumnType::Text),
    col("Sub-Category", "sub_category", ColumnType::Text),
    col("Product Name", "product_name", ColumnType::Text),
    col("Sales", "sales", ColumnType::Decimal),
];

static BY_SOURCE: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    SALES_SCHEMA
        .iter()
        .enumerate()
        .map(|(i, c)| (c.source, i))
        .collect()
});

/// Position of a CSV header in `SALES_SCHEMA`.
pub fn position_of(source: &str) -> Option<usize> {
    BY_SOURCE.get(source.trim()).copied()
}

/// Headers from `SALES_SCHEMA` that are absent from `headers`.
pub fn missing_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut present = [false; SALES_SCHEMA.len()];
    for h in headers {
        if let Some(i) = position_of(h) {
            present[i] = true;
        }
    }
    SALES_SCHEMA
        .iter()
        .zip(present)
        .filter(|(_, seen)| !seen)
        .map(|(c, _)| c.source.to_string())
        .collect()
}

/// Headers that are not part of `SALES_SCHEMA`.
pub fn unknown_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .filter(|h| position_of(h).is_none())
        .map(str::to_string)
        .collect()
}

/// For each schema column, the index of its field in a CSV record with the
/// given headers. Fails on missing, duplicated or unknown headers.
pub fn resolve_headers(headers: &csv::StringRecord) -> Result<Vec<usize>, String> {
    let unknown = unknown_headers(headers.iter());
    if !unknown.is_empty() {
        return Err(format!("unexpected columns: {}", unknown.join(", ")));
    }
    let missing = missing_headers(headers.iter());
    if !missing.is_empty() {
        return Err(format!("missing columns: {}", missing.join(", ")));
    }
    let mut slots: Vec<Option<usize>> = vec![None; SALES_SCHEMA.len()];
    for (field_idx, h) in headers.iter().enumerate() {
        if let Some(i) = position_of(h) {
            if slots[i].is_some() {
                return Err(format!("duplicate column `{}`", h));
            }
            slots[i] = Some(field_idx);
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

/// A typed database value. `None` binds as SQL NULL of the column's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(Option<i32>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    /// Validated decimal text, bound and cast to `NUMERIC` so no precision
    /// is lost in transit.
    Decimal(Option<String>),
}
