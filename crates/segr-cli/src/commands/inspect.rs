//! Inspect command - show how a document would be split.

use std::path::PathBuf;

use clap::Args;

use segr_core::{Segregator, SegregationReport};

use super::config::load_config;
use super::TextArgs;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    text: TextArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.text.apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let input = args.input.clone();
    let report = tokio::task::spawn_blocking(move || Segregator::new(&config)?.analyze(&input))
        .await??;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => format_text(&report),
    };
    println!("{}", output);

    Ok(())
}

fn format_text(report: &SegregationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Source: {}\n", report.source.display()));
    output.push_str(&format!("Pages: {}\n\n", report.page_count));

    output.push_str("Page  Account  Bill date  Chars\n");
    for page in &report.pages {
        output.push_str(&format!(
            "{:>4}  {:>7}  {:>9}  {:>5}\n",
            page.index, page.metadata.account_number, page.metadata.bill_date, page.text_length
        ));
    }
    output.push('\n');

    output.push_str("Outputs:\n");
    for planned in &report.outputs {
        let pages = planned
            .pages
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("  {}  pages [{}]\n", planned.file_name, pages));
    }

    output
}
