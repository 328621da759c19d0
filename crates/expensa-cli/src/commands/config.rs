//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use expensa_core::ExpensaConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "normalize.title_max_chars")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "server.tokens.<token>" to add a token)
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("expensa")
        .join("config.json")
}

/// Load `--config` if given, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExpensaConfig> {
    if let Some(path) = config_path {
        let path = Path::new(path);
        return ExpensaConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e));
    }

    let path = default_config_path();
    if path.exists() {
        Ok(ExpensaConfig::from_file(&path)?)
    } else {
        Ok(ExpensaConfig::default())
    }
}

fn read_or_default(path: &Path) -> anyhow::Result<ExpensaConfig> {
    if path.exists() {
        Ok(ExpensaConfig::from_file(path)?)
    } else {
        Ok(ExpensaConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    let config = read_or_default(path)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    ExpensaConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(read_or_default(path)?)?;
    let value = lookup(&json, key)?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(read_or_default(path)?)?;
    assign(&mut json, key, parsed_value.clone())?;

    // Round-trip to reject values of the wrong type
    let config: ExpensaConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'expensa config init' to create a configuration file.");
    }

    Ok(())
}

/// Follow a dotted key path through a JSON document.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Set the value at a dotted key path. Intermediate objects must exist.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_path, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, key),
    };

    let mut current = json;
    if let Some(parent_path) = parent_path {
        for part in parent_path.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let Some(object) = current.as_object_mut() else {
        anyhow::bail!("Cannot set value at non-object path: {}", key);
    };
    object.insert(last.to_string(), value);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_key() {
        let json = serde_json::to_value(ExpensaConfig::default()).unwrap();
        assert_eq!(lookup(&json, "normalize.title_max_chars").unwrap(), &json!(50));
        assert!(lookup(&json, "normalize.missing").is_err());
    }

    #[test]
    fn test_assign_token_and_round_trip() {
        let mut json = serde_json::to_value(ExpensaConfig::default()).unwrap();
        assign(&mut json, "server.tokens.s3cret", json!(42)).unwrap();
        assign(&mut json, "normalize.skip_credits", json!(true)).unwrap();

        let config: ExpensaConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.server.tokens.get("s3cret"), Some(&42));
        assert!(config.normalize.skip_credits);
    }

    #[test]
    fn test_assign_rejects_missing_parent() {
        let mut json = serde_json::to_value(ExpensaConfig::default()).unwrap();
        assert!(assign(&mut json, "nope.deeper.key", json!(1)).is_err());
        assert!(assign(&mut json, "normalize.title_max_chars.x", json!(1)).is_err());
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"pdf": {"max_pages": 3}}"#).unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.pdf.max_pages, 3);
        assert!(load_config(Some("/nonexistent/expensa.json")).is_err());
    }
}
