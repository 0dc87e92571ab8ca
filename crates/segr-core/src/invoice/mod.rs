//! Billing metadata extraction.

mod metadata;
pub mod rules;

pub use metadata::{extract_metadata, MetadataExtractor, PageDiagnostics};
