//! Subcommands.

pub mod config;
pub mod inspect;
pub mod split;

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use segr_core::models::config::{GroupOrder, SegrConfig, TextSource};

/// Page text options shared by `split` and `inspect`.
#[derive(Args, Debug, Clone)]
pub struct TextArgs {
    /// Where page text comes from (default: from config, `auto`)
    #[arg(long, value_enum)]
    text_source: Option<TextSourceArg>,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Group write order (default: from config, `first-seen`)
    #[arg(long, value_enum)]
    order: Option<OrderArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TextSourceArg {
    /// Text layer when long enough, OCR otherwise
    Auto,
    /// Text layer only
    Embedded,
    /// OCR on page images only
    Ocr,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    /// Order in which each invoice first appears
    FirstSeen,
    /// Sorted by account number, then bill date
    Key,
}

impl TextArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut SegrConfig) {
        if let Some(source) = self.text_source {
            config.text.source = match source {
                TextSourceArg::Auto => TextSource::Auto,
                TextSourceArg::Embedded => TextSource::Embedded,
                TextSourceArg::Ocr => TextSource::Ocr,
            };
        }
        if let Some(model_dir) = &self.model_dir {
            config.ocr.model_dir = model_dir.clone();
        }
        if let Some(order) = self.order {
            config.output.order = match order {
                OrderArg::FirstSeen => GroupOrder::FirstSeen,
                OrderArg::Key => GroupOrder::Key,
            };
        }
    }
}
