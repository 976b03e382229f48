//! Config command - inspect and edit the per-user configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use mobinv_core::MobinvConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Where to write it (default: the user config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, e.g. "detection.window_radius"
    Get { key: String },

    /// Change one value; JSON literals are parsed, anything else is a string
    Set { key: String, value: String },

    /// Print where the user config file lives
    Path,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let user_path = default_config_path();

    match args.command {
        ConfigCommand::Show => {
            if !user_path.exists() {
                eprintln!("{} Using built-in defaults", style("ℹ").blue());
            }
            print_json(&serde_json::to_value(effective_config(&user_path)?)?)
        }
        ConfigCommand::Init { output, force } => {
            let target = output.unwrap_or(user_path);
            if target.exists() && !force {
                anyhow::bail!("{} already exists; pass --force to replace it", target.display());
            }
            write_config(&target, &MobinvConfig::default())?;
            println!("{} Wrote defaults to {}", style("✓").green(), target.display());
            Ok(())
        }
        ConfigCommand::Get { key } => {
            let tree = serde_json::to_value(effective_config(&user_path)?)?;
            print_json(lookup(&tree, &key)?)
        }
        ConfigCommand::Set { key, value } => {
            let value = parse_value(&value);
            let mut tree = serde_json::to_value(effective_config(&user_path)?)?;
            assign(&mut tree, &key, value.clone())?;

            let updated: MobinvConfig = serde_json::from_value(tree)
                .with_context(|| format!("Invalid value for {}", key))?;
            updated.validate()?;
            write_config(&user_path, &updated)?;

            println!("{} {} = {}", style("✓").green(), key, value);
            Ok(())
        }
        ConfigCommand::Path => {
            let state = if user_path.exists() {
                style("exists").green()
            } else {
                style("missing, run 'mobinv config init'").yellow()
            };
            println!("{} ({})", user_path.display(), state);
            Ok(())
        }
    }
}

/// Per-user configuration file, `<config dir>/mobinv/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mobinv")
        .join("config.json")
}

fn effective_config(path: &Path) -> anyhow::Result<MobinvConfig> {
    if path.exists() {
        Ok(MobinvConfig::from_file(path)?)
    } else {
        Ok(MobinvConfig::default())
    }
}

fn write_config(path: &Path, config: &MobinvConfig) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    config
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn lookup<'v>(tree: &'v Value, key: &str) -> anyhow::Result<&'v Value> {
    key.split('.')
        .try_fold(tree, |node, part| node.get(part))
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))
}

/// Replace an existing leaf; unknown keys are an error rather than silently added.
fn assign(tree: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key
        .split('.')
        .try_fold(tree, |node, part| node.get_mut(part))
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
    if slot.is_object() {
        anyhow::bail!("{} is a section; set one of its fields instead", key);
    }
    *slot = value;
    Ok(())
}
