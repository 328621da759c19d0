//! Batch command - import several statements.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use expensa_core::{IngestionResult, Ingestor, SqliteStore, UserId};

use super::FilterArgs;
use super::config::load_config;
use super::extract::read_statement;
use super::import::open_store;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching statement PDFs
    #[arg(required = true)]
    input: String,

    /// User the expenses belong to
    #[arg(short, long)]
    user: i64,

    /// SQLite database (default: storage.database_path from config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Write a per-file summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Detect duplicates but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    filters: FilterArgs,
}

/// Outcome of importing a single file.
struct FileResult {
    path: PathBuf,
    result: Option<IngestionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = statement_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} statements to import",
        style("ℹ").blue(),
        files.len()
    );

    let store = open_store(args.database.as_ref(), &config)?;
    let ingestor = args
        .filters
        .apply(Ingestor::from_config(&config, &store)?, &config)
        .with_dry_run(args.dry_run);
    let user = UserId(args.user);

    let pb = ProgressBar::new(files.len() as u64);
    if let Ok(progress_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
    {
        pb.set_style(progress_style.progress_chars("=>-"));
    }

    // Sequential: every file reads and writes the same user's rows
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let outcome = import_file(&path, &ingestor, user, &store);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => results.push(FileResult {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    pb.abandon();
                    error!("Failed to import {}: {}", path.display(), error_msg);
                    anyhow::bail!("Import failed for {}: {}", path.display(), error_msg);
                }
                warn!("Failed to import {}: {}", path.display(), error_msg);
                results.push(FileResult {
                    path,
                    result: None,
                    error: Some(error_msg),
                    processing_time_ms,
                });
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let saved: usize = results
        .iter()
        .filter_map(|r| r.result.as_ref())
        .map(|r| r.total_saved)
        .sum();

    println!();
    println!(
        "{} Imported {} files in {:?}{}",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        if args.dry_run { " (dry run)" } else { "" }
    );
    println!(
        "   {} expenses saved, {} files failed",
        style(saved).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand a glob pattern into PDF paths, sorted.
fn statement_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn import_file(
    path: &Path,
    ingestor: &Ingestor,
    user: UserId,
    store: &SqliteStore,
) -> anyhow::Result<IngestionResult> {
    let data = read_statement(path)?;
    Ok(ingestor.ingest_pdf(&data, user, store)?)
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "total_extracted",
        "total_saved",
        "duplicates",
        "skipped",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let record = match &result.result {
            Some(ingested) => [
                filename,
                "success".to_string(),
                ingested.total_extracted.to_string(),
                ingested.total_saved.to_string(),
                ingested.duplicates().to_string(),
                ingested.total_skipped().to_string(),
                result.processing_time_ms.to_string(),
                String::new(),
            ],
            None => [
                filename,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                result.processing_time_ms.to_string(),
                result.error.clone().unwrap_or_default(),
            ],
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
