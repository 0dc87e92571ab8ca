//! Core library for splitting scanned multi-invoice PDFs.
//!
//! This crate provides:
//! - Billing metadata extraction (account number, bill date) from page text
//! - Grouping of contiguous pages into invoices with neighbor fallback
//! - PDF splitting into one file per invoice
//! - Page text sources: embedded text layer and pure Rust OCR

pub mod error;
pub mod grouping;
pub mod invoice;
pub mod materialize;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{Result, SegrError};
pub use grouping::{group_pages_with_fallback, InvoiceGroup, InvoiceGroups};
pub use invoice::{extract_metadata, MetadataExtractor};
pub use materialize::{output_filename, GroupMaterializer, PlannedOutput};
pub use models::config::SegrConfig;
pub use models::page::{InvoiceKey, PageMetadata, PageText, SENTINEL};
pub use ocr::{EmbeddedTextExtractor, HybridTextExtractor, PageTextExtractor};
#[cfg(feature = "native")]
pub use ocr::{OcrTextExtractor, PureOcrEngine};
pub use pdf::{PdfDocument, PdfSplitter};
pub use pipeline::{process, PageReport, SegregationReport, Segregator};
