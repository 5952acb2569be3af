// Entry point: clean the sales export, then load it into Postgres.
//
// With no arguments this reads `dataset.csv`, writes
// `cleaned_sales_data.csv` and replaces the `sales_data` table in the
// database named by `DATABASE_URL`. Any failure exits non-zero.
use anyhow::{Context, Result};
use clap::Parser;
use sales_etl::config::{self, LoadMode, LoadOptions, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_TABLE};
use sales_etl::{cleaner, db, loader, output, util, EtlError};
use sales_etl::types::RunSummary;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clean the sales export and load it into Postgres", long_about = None)]
struct Cli {
    /// Raw sales export to clean
    #[arg(long, env = "SALES_ETL_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Where the cleaned CSV is written
    #[arg(long, env = "SALES_ETL_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Destination table
    #[arg(long, env = "SALES_ETL_TABLE", default_value = DEFAULT_TABLE)]
    table: String,

    /// What to do when the destination table already exists
    #[arg(long, env = "SALES_ETL_LOAD_MODE", value_enum, default_value_t = LoadMode::Replace)]
    mode: LoadMode,

    /// Postgres connection string (falls back to SALES_ETL_DATABASE_URL)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Stop after writing the cleaned CSV
    #[arg(long)]
    clean_only: bool,

    /// Also write a JSON summary of the run
    #[arg(long, env = "SALES_ETL_REPORT")]
    report: Option<PathBuf>,

    /// Number of cleaned rows to print
    #[arg(long, default_value_t = 3)]
    preview: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Step 1: data cleaning
    let (records, report) = cleaner::clean_records(&cli.input)
        .map_err(EtlError::from)
        .with_context(|| format!("failed to clean {}", cli.input.display()))?;
    cleaner::write_cleaned(&cli.output, &records)
        .map_err(EtlError::from)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!(
        "Cleaned data saved to {} ({} rows read, {} duplicates removed, {} postal codes filled)",
        cli.output.display(),
        util::format_int(report.rows_read),
        util::format_int(report.duplicates_removed),
        util::format_int(report.postal_codes_filled)
    );
    if cli.preview > 0 {
        output::preview_table_rows(&records, cli.preview);
    }

    if cli.clean_only {
        println!("Skipping database load.");
        return write_summary(cli.report.as_deref(), RunSummary { clean: report, load: None });
    }

    // Step 2: load into Postgres
    let options = LoadOptions::new(cli.table, cli.mode).map_err(EtlError::from)?;
    let database_url = config::database_url(cli.database_url).map_err(EtlError::from)?;
    let pool = db::connect(&database_url).await.map_err(EtlError::from)?;
    let loaded = loader::load(&pool, &cli.output, &options)
        .await
        .map_err(EtlError::from)
        .with_context(|| format!("failed to load into table {}", options.table))?;
    pool.close().await;

    println!(
        "Data successfully loaded into {} ({} rows, mode {})",
        loaded.table,
        util::format_int(loaded.rows_inserted),
        loaded.mode
    );
    write_summary(
        cli.report.as_deref(),
        RunSummary {
            clean: report,
            load: Some(loaded),
        },
    )?;
    println!("Workflow completed successfully!");
    Ok(())
}

fn write_summary(path: Option<&Path>, summary: RunSummary) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    output::write_json(path, &summary)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Run summary saved to {}", path.display());
    Ok(())
}
