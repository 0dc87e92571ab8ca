//! PDF processing module.

mod document;
#[cfg(test)]
pub(crate) mod fixtures;

pub use document::PdfDocument;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Copies pages of a source document into new documents.
pub trait PdfSplitter {
    /// Number of pages in the source document.
    fn page_count(&self) -> usize;

    /// Write the given 0-based pages, in source order, to a new file at `path`.
    fn write_pages(&self, pages: &[usize], path: &Path) -> Result<()>;
}
