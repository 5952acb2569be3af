use crate::error::LoadError;
use crate::schema::SALES_SCHEMA;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use std::time::Duration;
use tracing::info;

/// Open a single-connection pool; the load is one sequential operation.
pub async fn connect(database_url: &str) -> Result<PgPool, LoadError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    info!("database connection established");
    Ok(pool)
}

/// Double-quote an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE` statement for the canonical sales schema.
pub fn create_table_sql(table: &str, if_not_exists: bool) -> String {
    let columns: Vec<String> = SALES_SCHEMA
        .iter()
        .map(|c| format!("    {} {}", quote_ident(c.name), c.ty.sql_type()))
        .collect();
    format!(
        "CREATE TABLE {}{} (\n{}\n)",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        quote_ident(table),
        columns.join(",\n")
    )
}

pub async fn table_exists(conn: &mut PgConnection, table: &str) -> Result<bool, LoadError> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
        "#,
    )
    .bind(table)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

/// `(column_name, data_type)` pairs of `table`, in column order.
pub async fn describe_table(
    conn: &mut PgConnection,
    table: &str,
) -> Result<Vec<(String, String)>, LoadError> {
    let columns: Vec<(String, String)> = sqlx::query_as(
        r#"
            SELECT column_name::text, data_type::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;
    Ok(columns)
}

/// Fail unless `table` has exactly the canonical columns and types.
pub async fn verify_schema(conn: &mut PgConnection, table: &str) -> Result<(), LoadError> {
    let actual = describe_table(conn, table).await?;
    let expected: Vec<(String, String)> = SALES_SCHEMA
        .iter()
        .map(|c| (c.name.to_string(), c.ty.catalog_name().to_string()))
        .collect();
    if actual == expected {
        return Ok(());
    }
    let render = |cols: &[(String, String)]| {
        cols.iter()
            .map(|(n, t)| format!("{n} {t}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Err(LoadError::SchemaMismatch(format!(
        "table \"{}\" has columns [{}], expected [{}]",
        table,
        render(&actual),
        render(&expected)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_statement_lists_columns_in_order() {
        let sql = create_table_sql("sales_data", false);
        assert!(sql.starts_with("CREATE TABLE \"sales_data\" ("));
        let row_id = sql.find("\"row_id\" INTEGER").unwrap();
        let postal = sql.find("\"postal_code\" INTEGER").unwrap();
        let sales = sql.find("\"sales\" NUMERIC").unwrap();
        assert!(row_id < postal && postal < sales);
        assert!(sql.contains("\"order_date\" DATE"));
        assert_eq!(sql.matches(',').count(), 17);
    }

    #[test]
    fn if_not_exists_variant() {
        assert!(create_table_sql("t", true).starts_with("CREATE TABLE IF NOT EXISTS \"t\""));
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
