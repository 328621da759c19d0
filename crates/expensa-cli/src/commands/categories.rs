//! Categories command - manage the category rules used for new expenses.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use expensa_core::categorize::default_rules;
use expensa_core::{CategoryRule, CategoryTable, SqliteStore};

use super::config::load_config;
use super::import::open_store;

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    /// SQLite database (default: storage.database_path from config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: CategoriesCommand,
}

#[derive(Subcommand)]
enum CategoriesCommand {
    /// Show the rules in precedence order
    List {
        /// Print the rules as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the rules with a JSON file of {"category", "keywords"} objects
    Load {
        /// Rules file
        file: PathBuf,
    },

    /// Restore the built-in rules
    Reset,
}

pub async fn run(args: CategoriesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(args.database.as_ref(), &config)?;

    match args.command {
        CategoriesCommand::List { json } => list_rules(&store, json),
        CategoriesCommand::Load { file } => {
            let rules = read_rules(&file)?;
            store.replace_rules(&rules)?;
            info!("Loaded {} category rules from {}", rules.len(), file.display());
            println!("{} Loaded {} category rules", style("✓").green(), rules.len());
            Ok(())
        }
        CategoriesCommand::Reset => {
            let rules = default_rules();
            store.replace_rules(&rules)?;
            println!(
                "{} Restored {} built-in category rules",
                style("✓").green(),
                rules.len()
            );
            Ok(())
        }
    }
}

fn list_rules(store: &SqliteStore, json: bool) -> anyhow::Result<()> {
    let rules = store.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    for rule in &rules {
        println!("{:<20} {}", style(&rule.category).bold(), rule.keywords.join(", "));
    }
    Ok(())
}

/// Read a rules file, lower-casing keywords the way the categorizer matches them.
fn read_rules(path: &Path) -> anyhow::Result<Vec<CategoryRule>> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let rules: Vec<CategoryRule> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid rules file {}: {}", path.display(), e))?;

    if rules.is_empty() {
        anyhow::bail!("Rules file {} has no rules", path.display());
    }
    if let Some(rule) = rules.iter().find(|r| r.category.trim().is_empty()) {
        anyhow::bail!("Rule with keywords [{}] has no category", rule.keywords.join(", "));
    }

    Ok(rules
        .into_iter()
        .map(|rule| CategoryRule {
            category: rule.category,
            keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
        })
        .collect())
}
