//! CLI application for PhonePe statement ingestion.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

use commands::{batch, categories, config, extract, import, serve};

/// expensa - Import PhonePe statements into your expense tracker
#[derive(Parser)]
#[command(name = "expensa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract transactions from a statement without saving them
    Extract(extract::ExtractArgs),

    /// Import a statement into the expense database
    Import(import::ImportArgs),

    /// Import several statements
    Batch(batch::BatchArgs),

    /// Run the upload API
    Serve(serve::ServeArgs),

    /// Manage category rules
    Categories(categories::CategoriesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Import(args) => import::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Categories(args) => categories::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
