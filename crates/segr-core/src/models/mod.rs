//! Data models shared across the pipeline.

pub mod config;
pub mod page;

pub use config::{GroupOrder, OcrConfig, OutputConfig, SegrConfig, TextConfig, TextSource};
pub use page::{InvoiceKey, PageMetadata, PageText, SENTINEL};
