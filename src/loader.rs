// Loads a cleaned sales file into Postgres.
//
// Every value is coerced to its column type before the database is touched,
// and the DDL plus all inserts run in one transaction: a failed load leaves
// the destination table exactly as it was.
use crate::config::{LoadMode, LoadOptions};
use crate::db;
use crate::error::LoadError;
use crate::schema::{resolve_headers, Cell, SALES_SCHEMA};
use crate::types::LoadReport;
use csv::ReaderBuilder;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use std::path::Path;
use tracing::{debug, info};

/// Rows per `INSERT`; keeps bind parameters well under Postgres' 65,535.
pub const INSERT_BATCH_ROWS: usize = 1000;

/// Read the cleaned file and coerce every field to its column type.
///
/// Columns are matched by header name, so a reordered file loads correctly.
/// Each returned row is in `SALES_SCHEMA` order.
pub fn read_cleaned(path: &Path) -> Result<Vec<Vec<Cell>>, LoadError> {
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let headers = rdr.headers()?.clone();
    let index = resolve_headers(&headers).map_err(LoadError::SchemaMismatch)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let mut cells = Vec::with_capacity(SALES_SCHEMA.len());
        for (column, &field) in SALES_SCHEMA.iter().zip(&index) {
            let raw = record.get(field).unwrap_or("");
            let cell = column.ty.coerce(raw).ok_or_else(|| LoadError::BadValue {
                row: i as u64 + 1,
                column: column.name,
                value: raw.to_string(),
                expected: column.ty.catalog_name(),
            })?;
            cells.push(cell);
        }
        rows.push(cells);
    }
    debug!(path = %path.display(), rows = rows.len(), "read cleaned file");
    Ok(rows)
}

/// Load `cleaned_path` into the table named by `options`, all or nothing.
pub async fn load(
    pool: &PgPool,
    cleaned_path: &Path,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    let rows = read_cleaned(cleaned_path)?;

    let mut tx = pool.begin().await?;
    let report = write_table(&mut *tx, &rows, options).await?;
    tx.commit().await?;

    info!(
        table = %report.table,
        mode = %report.mode,
        rows = report.rows_inserted,
        batches = report.batches,
        "loaded sales table"
    );
    Ok(report)
}

/// Prepare the destination per the load mode and insert `rows`.
///
/// Run this inside a transaction; it does not commit.
pub async fn write_table(
    conn: &mut PgConnection,
    rows: &[Vec<Cell>],
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    let table = db::quote_ident(&options.table);

    match options.mode {
        LoadMode::Replace => {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(&mut *conn)
                .await?;
            sqlx::query(&db::create_table_sql(&options.table, false))
                .execute(&mut *conn)
                .await?;
        }
        LoadMode::Append => {
            sqlx::query(&db::create_table_sql(&options.table, true))
                .execute(&mut *conn)
                .await?;
            db::verify_schema(conn, &options.table).await?;
        }
        LoadMode::Fail => {
            if db::table_exists(conn, &options.table).await? {
                return Err(LoadError::TableExists(options.table.clone()));
            }
            sqlx::query(&db::create_table_sql(&options.table, false))
                .execute(&mut *conn)
                .await?;
        }
    }

    let column_list = SALES_SCHEMA
        .iter()
        .map(|c| db::quote_ident(c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut rows_inserted = 0u64;
    let mut batches = 0usize;
    for chunk in rows.chunks(INSERT_BATCH_ROWS) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, column_list));
        qb.push_values(chunk, |mut b, row| {
            for cell in row {
                match cell {
                    Cell::Integer(v) => {
                        b.push_bind(*v);
                    }
                    Cell::Text(v) => {
                        b.push_bind(v.clone());
                    }
                    Cell::Date(v) => {
                        b.push_bind(*v);
                    }
                    Cell::Decimal(v) => {
                        b.push_bind(v.clone()).push_unseparated("::numeric");
                    }
                }
            }
        });
        let result = qb.build().execute(&mut *conn).await?;
        rows_inserted += result.rows_affected();
        batches += 1;
        debug!(batch = batches, rows = result.rows_affected(), "inserted batch");
    }

    Ok(LoadReport {
        table: options.table.clone(),
        mode: options.mode,
        rows_inserted,
        batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    const HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer ID,Customer Name,Segment,Country,City,State,Postal Code,Region,Product ID,Category,Sub-Category,Product Name,Sales";

    fn write(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("cleaned.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn coerces_a_cleaned_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            &format!(
                "{HEADER}\n1,CA-2017-152156,2017-11-08,2017-11-11,Second Class,CG-12520,Claire Gute,Consumer,United States,Henderson,Kentucky,42420,South,FUR-BO-10001798,Furniture,Bookcases,Bush Somerset Collection Bookcase,261.96\n"
            ),
        );
        let rows = read_cleaned(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), 18);
        assert_eq!(row[0], Cell::Integer(Some(1)));
        assert_eq!(row[2], Cell::Date(NaiveDate::from_ymd_opt(2017, 11, 8)));
        assert_eq!(row[11], Cell::Integer(Some(42420)));
        assert_eq!(row[17], Cell::Decimal(Some("261.96".into())));
    }

    #[test]
    fn non_numeric_sales_is_rejected_before_any_sql() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            &format!(
                "{HEADER}\n1,CA-1,2017-11-08,2017-11-11,Second Class,CG-1,A,Consumer,US,X,Y,0,South,P-1,Furniture,Bookcases,Thing,twelve\n"
            ),
        );
        match read_cleaned(&path) {
            Err(LoadError::BadValue { row, column, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "sales");
                assert_eq!(value, "twelve");
            }
            other => panic!("expected BadValue, got {:?}", other),
        }
    }

    #[test]
    fn reordered_columns_keep_their_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut cols: Vec<&str> = HEADER.split(',').collect();
        let mut vals = vec![
            "7", "CA-7", "2018-01-02", "2018-01-05", "Standard Class", "CG-7", "B", "Corporate",
            "US", "Austin", "Texas", "78701", "Central", "OFF-1", "Office Supplies", "Paper",
            "Copy Paper", "19.44",
        ];
        cols.reverse();
        vals.reverse();
        let path = write(&dir, &format!("{}\n{}\n", cols.join(","), vals.join(",")));
        let rows = read_cleaned(&path).unwrap();
        assert_eq!(rows[0][0], Cell::Integer(Some(7)));
        assert_eq!(rows[0][9], Cell::Text(Some("Austin".into())));
        assert_eq!(rows[0][17], Cell::Decimal(Some("19.44".into())));
    }

    #[test]
    fn missing_column_is_a_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let header = HEADER.replace(",Sales", "");
        let path = write(&dir, &format!("{header}\n"));
        assert!(matches!(read_cleaned(&path), Err(LoadError::SchemaMismatch(_))));
    }
}
