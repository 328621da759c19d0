//! Extract command - parse and categorize a statement without saving it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use expensa_core::statement::rules::format_rupee_amount;
use expensa_core::{DefaultCategories, ExpenseCandidate, Ingestor};

use super::FilterArgs;
use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let data = read_statement(&args.input)?;
    info!("Extracting transactions from {}", args.input.display());

    let pb = spinner("Reading PDF...");

    let ingestor = args
        .filters
        .apply(Ingestor::from_config(&config, &DefaultCategories)?, &config);
    let transactions = ingestor.extract(&data)?;

    pb.set_message("Categorizing...");
    let mut candidates = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        if let Some(reason) = ingestor.filter(&transaction) {
            debug!("Skipping line {}: {}", transaction.line, reason.as_str());
            continue;
        }
        let line = transaction.line;
        match ingestor.normalizer().normalize(transaction) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => warn!("Skipping line {}: {}", line, e),
        }
    }

    pb.finish_and_clear();

    if candidates.is_empty() {
        anyhow::bail!("No transactions found in {}", args.input.display());
    }

    let output = format_candidates(&candidates, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} transactions written to {}",
            style("✓").green(),
            candidates.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read a statement file, rejecting anything not named `.pdf`.
pub fn read_statement(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("File must be a PDF: {}", path.display());
    }

    Ok(fs::read(path)?)
}

pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(progress_style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(progress_style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn format_candidates(
    candidates: &[ExpenseCandidate],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(candidates)?),
        OutputFormat::Csv => format_csv(candidates),
        OutputFormat::Text => Ok(format_text(candidates)),
    }
}

fn format_csv(candidates: &[ExpenseCandidate]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "transaction_date",
        "merchant_name",
        "amount",
        "direction",
        "category",
        "title",
        "status",
        "reference",
    ])?;

    for candidate in candidates {
        let transaction = &candidate.transaction;
        wtr.write_record([
            transaction.transaction_date.to_string(),
            transaction.merchant_name.clone(),
            format!("{:.2}", transaction.amount),
            transaction.direction.as_str().to_string(),
            candidate.category.clone(),
            candidate.title.clone(),
            format!("{:?}", transaction.status).to_lowercase(),
            transaction.reference.clone().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(candidates: &[ExpenseCandidate]) -> String {
    let mut output = String::new();

    for candidate in candidates {
        let transaction = &candidate.transaction;
        output.push_str(&format!(
            "{}  {:<32} {:>14}  {}\n",
            transaction.transaction_date,
            candidate.title,
            format_rupee_amount(transaction.amount),
            candidate.category
        ));
    }

    let total = candidates
        .iter()
        .map(|c| c.amount())
        .sum::<Decimal>();
    output.push_str(&format!(
        "\n{} transactions, total {}\n",
        candidates.len(),
        format_rupee_amount(total)
    ));

    output
}
