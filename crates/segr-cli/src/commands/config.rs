//! Config command - inspect and create the configuration file.
//!
//! Every subcommand resolves the file the same way as `split` and `inspect`:
//! the global `--config` path, then `<config dir>/segr/config.json`, then
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use segr_core::models::config::SegrConfig;

use super::TextArgs;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration and where it came from
    Show,

    /// Write a configuration file, optionally seeded with text options
    Init(InitArgs),

    /// Print one value by dotted key (e.g. "output.order")
    Get { key: String },

    /// Print the configuration file location
    Path,

    /// Verify that the configured OCR model files exist
    Check,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write (default: the resolved configuration path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,

    #[command(flatten)]
    text: TextArgs,
}

/// Effective configuration and the file it was resolved against.
struct Resolved {
    config: SegrConfig,
    path: PathBuf,
    from_file: bool,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("segr")
        .join("config.json")
}

fn resolve(path: Option<&str>) -> anyhow::Result<Resolved> {
    // An explicit path must exist; the default one is optional.
    if let Some(path) = path {
        let path = PathBuf::from(path);
        return Ok(Resolved {
            config: SegrConfig::from_file(&path)?,
            path,
            from_file: true,
        });
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(Resolved {
            config: SegrConfig::from_file(&path)?,
            path,
            from_file: true,
        })
    } else {
        Ok(Resolved {
            config: SegrConfig::default(),
            path,
            from_file: false,
        })
    }
}

/// Load the configuration from `path`, the default location, or defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<SegrConfig> {
    Ok(resolve(path)?.config)
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show(config_path),
        ConfigCommand::Init(init_args) => init(init_args, config_path),
        ConfigCommand::Get { key } => get(&key, config_path),
        ConfigCommand::Path => path(config_path),
        ConfigCommand::Check => check(config_path),
    }
}

fn show(config_path: Option<&str>) -> anyhow::Result<()> {
    let resolved = resolve(config_path)?;
    if resolved.from_file {
        eprintln!("{} Loaded {}", style("ℹ").blue(), resolved.path.display());
    } else {
        eprintln!("{} No config file, showing defaults", style("ℹ").blue());
    }
    println!("{}", serde_json::to_string_pretty(&resolved.config)?);
    Ok(())
}

fn init(args: InitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let target = args
        .output
        .or_else(|| config_path.map(PathBuf::from))
        .unwrap_or_else(default_config_path);

    if target.exists() && !args.force {
        anyhow::bail!(
            "{} already exists, pass --force to replace it",
            target.display()
        );
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut config = SegrConfig::default();
    args.text.apply(&mut config);
    config.save(&target)?;

    println!("{} Wrote {}", style("✓").green(), target.display());
    Ok(())
}

fn get(key: &str, config_path: Option<&str>) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_config(config_path)?)?;
    let value = lookup(&json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    // Plain strings print bare so scripts can use the value directly.
    match value.as_str() {
        Some(s) => println!("{}", s),
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(json, |node, part| node.get(part))
}

fn path(config_path: Option<&str>) -> anyhow::Result<()> {
    let target = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let status = if target.exists() {
        style("exists").green()
    } else {
        style("not created, run `segr config init`").yellow()
    };
    println!("{} ({})", target.display(), status);
    Ok(())
}

fn check(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let missing = report_model_files(&config.ocr.model_files());

    if !missing.is_empty() {
        anyhow::bail!(
            "OCR models missing in {}: {}. Scanned pages will have no text",
            config.ocr.model_dir.display(),
            missing.join(", ")
        );
    }
    println!("{} OCR models ready", style("✓").green());
    Ok(())
}

/// Print one line per model file and return the names of missing ones.
fn report_model_files(files: &[PathBuf]) -> Vec<String> {
    let mut missing = Vec::new();
    for file in files {
        if file.exists() {
            println!("{} {}", style("✓").green(), file.display());
        } else {
            println!("{} {}", style("✗").red(), file.display());
            missing.push(file_name(file));
        }
    }
    missing
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_dotted_key() {
        let json = serde_json::to_value(SegrConfig::default()).unwrap();
        assert_eq!(lookup(&json, "output.order").and_then(|v| v.as_str()), Some("first-seen"));
        assert_eq!(lookup(&json, "text.min_text_length").and_then(|v| v.as_u64()), Some(50));
        assert!(lookup(&json, "output.missing").is_none());
        assert!(lookup(&json, "output.order.deeper").is_none());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        assert!(load_config(Some("/nonexistent/segr.json")).is_err());
    }

    #[test]
    fn test_explicit_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segr.json");
        std::fs::write(&path, r#"{"output": {"overwrite": false}}"#).unwrap();

        let resolved = resolve(path.to_str()).unwrap();
        assert!(resolved.from_file);
        assert_eq!(resolved.path, path);
        assert!(!resolved.config.output.overwrite);
    }
}
