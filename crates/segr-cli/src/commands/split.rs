//! Split command - write one PDF per invoice.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use segr_core::Segregator;

use super::config::load_config;
use super::TextArgs;

/// Arguments for the split command.
#[derive(Args)]
pub struct SplitArgs {
    /// Input PDF containing several invoices
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory (default: `<input stem>_invoices` next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Fail instead of replacing existing output files
    #[arg(long)]
    no_overwrite: bool,

    #[command(flatten)]
    text: TextArgs,
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoices");
    input.with_file_name(format!("{}_invoices", stem))
}

pub async fn run(args: SplitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.text.apply(&mut config);
    if args.no_overwrite {
        config.output.overwrite = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.input));

    info!("Splitting {} into {}", args.input.display(), output_dir.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Reading pages and writing invoices...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let input = args.input.clone();
    let target = output_dir.clone();
    let result = tokio::task::spawn_blocking(move || {
        Segregator::new(&config)?.process(&input, &target)
    })
    .await?;

    pb.finish_and_clear();
    let saved = result?;

    for path in &saved {
        println!("{} {}", style("✓").green(), path.display());
    }

    println!();
    println!(
        "{} {} invoice files saved in {}",
        style("ℹ").blue(),
        saved.len(),
        output_dir.display()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("/scans/batch3.pdf")),
            PathBuf::from("/scans/batch3_invoices")
        );
    }
}
