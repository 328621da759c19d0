//! Import command - ingest one statement into the expense database.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use expensa_core::statement::rules::format_rupee_amount;
use expensa_core::{ExpensaConfig, IngestionResult, Ingestor, SqliteStore, UserId};

use super::FilterArgs;
use super::config::load_config;
use super::extract::{read_statement, spinner};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// User the expenses belong to
    #[arg(short, long)]
    user: i64,

    /// SQLite database (default: storage.database_path from config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Detect duplicates but write nothing
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    filters: FilterArgs,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ImportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let data = read_statement(&args.input)?;
    let store = open_store(args.database.as_ref(), &config)?;
    let ingestor = args
        .filters
        .apply(Ingestor::from_config(&config, &store)?, &config)
        .with_dry_run(args.dry_run);

    info!("Importing {} for user {}", args.input.display(), args.user);

    let pb = spinner("Importing statement...");
    let result = ingestor.ingest_pdf(&data, UserId(args.user), &store);
    pb.finish_and_clear();
    let result = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, args.dry_run);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Open the SQLite store named on the command line or in the config.
pub fn open_store(database: Option<&PathBuf>, config: &ExpensaConfig) -> anyhow::Result<SqliteStore> {
    let path = database.unwrap_or(&config.storage.database_path);
    debug!("Opening expense database {}", path.display());
    SqliteStore::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))
}

fn print_result(result: &IngestionResult, dry_run: bool) {
    let verb = if dry_run { "Would save" } else { "Saved" };

    for candidate in &result.saved {
        println!(
            "  {} {}  {:<32} {:>14}  {}",
            style("+").green(),
            candidate.date(),
            candidate.title,
            format_rupee_amount(candidate.amount()),
            style(&candidate.category).dim()
        );
    }
    for skipped in &result.skipped {
        println!(
            "  {} {}  {:<32} {:>14}  {}",
            style("-").yellow(),
            skipped.transaction_date,
            skipped.merchant_name,
            format_rupee_amount(skipped.amount),
            style(skipped.reason.as_str()).yellow()
        );
    }

    println!();
    println!(
        "{} {} {} of {} transactions ({} duplicates, {} skipped)",
        style("✓").green(),
        verb,
        style(result.total_saved).green(),
        result.total_extracted,
        result.duplicates(),
        result.total_skipped()
    );
}
