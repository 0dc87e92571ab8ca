//! Error types for the segr-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the segr library.
#[derive(Error, Debug)]
pub enum SegrError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A result file could not be written.
    #[error("failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The source document could not be read or parsed.
    #[error("failed to open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// Failed to parse PDF data.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page index requested (0-based).
    #[error("invalid page index: {0}")]
    InvalidPage(usize),

    /// Failed to save a derived document.
    #[error("failed to save {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },
}

/// Errors related to per-page text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The page carries no raster image to recognize.
    #[error("no image found on page {0}")]
    NoImage(usize),

    /// The requested text source is not available in this build.
    #[error("text source unavailable: {0}")]
    Unavailable(String),

    /// Underlying PDF failure while reading a page.
    #[error("page read failed: {0}")]
    Page(#[from] PdfError),
}

/// Errors related to metadata field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A value matched a field pattern but failed structured parsing.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Result type for the segr library.
pub type Result<T> = std::result::Result<T, SegrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_path() {
        let err = SegrError::from(PdfError::Open {
            path: PathBuf::from("/tmp/batch.pdf"),
            reason: "not a PDF".to_string(),
        });
        assert_eq!(err.to_string(), "PDF error: failed to open /tmp/batch.pdf: not a PDF");

        let err = SegrError::Write {
            path: PathBuf::from("out/0124_1234.pdf"),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("out/0124_1234.pdf"));
    }
}
