use crate::error::CleanError;
use crate::output;
use crate::schema::{self, SALES_SCHEMA};
use crate::types::{CleanReport, RawRow, SalesRecord};
use crate::util::{is_missing, parse_date_dayfirst, parse_integral};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Clean `input` and write the result to `output`.
///
/// Nothing is written unless every row parses.
pub fn clean(input: &Path, output: &Path) -> Result<CleanReport, CleanError> {
    let (records, report) = clean_records(input)?;
    write_cleaned(output, &records)?;
    Ok(report)
}

/// Read, normalize and deduplicate the rows of `path` in memory.
pub fn clean_records(path: &Path) -> Result<(Vec<SalesRecord>, CleanReport), CleanError> {
    let records = read_and_normalize(path)?;
    let rows_read = records.len();
    let postal_codes_filled = records.iter().filter(|(_, filled)| *filled).count();

    let records = drop_duplicates(records.into_iter().map(|(r, _)| r));
    let report = CleanReport {
        rows_read,
        postal_codes_filled,
        duplicates_removed: rows_read - records.len(),
        rows_written: records.len(),
    };
    info!(
        input = %path.display(),
        rows_read = report.rows_read,
        duplicates_removed = report.duplicates_removed,
        postal_codes_filled = report.postal_codes_filled,
        "cleaned sales rows"
    );
    Ok((records, report))
}

/// Write cleaned rows with a header line, in canonical column order.
pub fn write_cleaned(path: &Path, records: &[SalesRecord]) -> Result<(), CleanError> {
    let headers: Vec<&str> = SALES_SCHEMA.iter().map(|c| c.source).collect();
    output::write_csv(path, &headers, records)?;
    debug!(output = %path.display(), rows = records.len(), "wrote cleaned file");
    Ok(())
}

/// Parse every row, failing on the first bad date or postal code.
/// Each record is paired with whether its postal code was defaulted.
fn read_and_normalize(path: &Path) -> Result<Vec<(SalesRecord, bool)>, CleanError> {
    if !path.exists() {
        return Err(CleanError::NotFound(path.to_path_buf()));
    }
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_path(path)?;
    let headers = rdr.headers()?;
    let missing = schema::missing_headers(headers.iter());
    if !missing.is_empty() {
        return Err(CleanError::MissingColumns(missing));
    }
    // Deduplication compares whole rows; a column we cannot carry through
    // would make distinct rows look identical.
    let unknown = schema::unknown_headers(headers.iter());
    if !unknown.is_empty() {
        return Err(CleanError::UnexpectedColumns(unknown));
    }

    let mut out = Vec::new();
    for (i, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = result?;
        let row_no = i as u64 + 1;

        let order_date = required_date(row_no, "Order Date", &row.order_date)?;
        let ship_date = required_date(row_no, "Ship Date", &row.ship_date)?;

        let (postal_code, filled) = match row.postal_code.as_deref() {
            Some(s) if !is_missing(s) => {
                let code = parse_integral(s).ok_or_else(|| CleanError::BadPostalCode {
                    row: row_no,
                    value: s.to_string(),
                })?;
                (code, false)
            }
            _ => (0, true),
        };

        out.push((
            SalesRecord {
                row_id: row.row_id,
                order_id: row.order_id,
                order_date,
                ship_date,
                ship_mode: row.ship_mode,
                customer_id: row.customer_id,
                customer_name: row.customer_name,
                segment: row.segment,
                country: row.country,
                city: row.city,
                state: row.state,
                postal_code,
                region: row.region,
                product_id: row.product_id,
                category: row.category,
                sub_category: row.sub_category,
                product_name: row.product_name,
                sales: row.sales,
            },
            filled,
        ));
    }
    Ok(out)
}

fn required_date(row: u64, column: &'static str, value: &str) -> Result<NaiveDate, CleanError> {
    parse_date_dayfirst(value).ok_or_else(|| CleanError::BadDate {
        row,
        column,
        value: value.to_string(),
    })
}

/// Keep the first occurrence of every distinct record, in input order.
pub fn drop_duplicates<I>(records: I) -> Vec<SalesRecord>
where
    I: IntoIterator<Item = SalesRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
