//! Page text sources: the PDF text layer and OCR on scanned page images.

#[cfg(feature = "native")]
mod engine;

#[cfg(feature = "native")]
pub use engine::{OcrTextExtractor, PureOcrEngine};

use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::{SegrConfig, TextSource};
use crate::models::page::PageText;
use crate::pdf::{PdfDocument, PdfSplitter};

/// Produces the text of individual pages.
pub trait PageTextExtractor {
    /// Text of one page (0-based).
    fn extract_page(&self, document: &PdfDocument, page: usize) -> Result<String, OcrError>;

    /// Text of every page in document order.
    ///
    /// A page that fails is logged and recorded as empty text so every page
    /// still gets an entry.
    fn extract_document(&self, document: &PdfDocument) -> Vec<PageText> {
        (0..document.page_count())
            .map(|page| {
                let text = match self.extract_page(document, page) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Text extraction failed for page {}: {}", page, e);
                        String::new()
                    }
                };
                debug!("Page {}: {} chars", page, text.len());
                PageText::new(page, text)
            })
            .collect()
    }
}

/// Reads the document's embedded text layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTextExtractor;

impl PageTextExtractor for EmbeddedTextExtractor {
    fn extract_page(&self, document: &PdfDocument, page: usize) -> Result<String, OcrError> {
        Ok(document.page_text(page)?)
    }
}

/// Uses the text layer when it is long enough and OCR otherwise.
///
/// Without an OCR engine, a page with any text layer keeps it. A page with no
/// text at all fails with [`OcrError::Unavailable`] so the gap is reported.
pub struct HybridTextExtractor {
    embedded: EmbeddedTextExtractor,
    ocr: Option<Box<dyn PageTextExtractor>>,
    min_text_length: usize,
}

impl HybridTextExtractor {
    pub fn new(ocr: Option<Box<dyn PageTextExtractor>>, min_text_length: usize) -> Self {
        Self {
            embedded: EmbeddedTextExtractor,
            ocr,
            min_text_length,
        }
    }
}

impl PageTextExtractor for HybridTextExtractor {
    fn extract_page(&self, document: &PdfDocument, page: usize) -> Result<String, OcrError> {
        let embedded = match self.embedded.extract_page(document, page) {
            Ok(text) => text,
            Err(e) => {
                debug!("No text layer on page {}: {}", page, e);
                String::new()
            }
        };

        if embedded.trim().len() >= self.min_text_length {
            return Ok(embedded);
        }

        match &self.ocr {
            Some(ocr) => {
                debug!("Page {} has {} chars of text layer, running OCR", page, embedded.trim().len());
                ocr.extract_page(document, page)
            }
            None if embedded.trim().is_empty() => Err(OcrError::Unavailable(format!(
                "page {} has no text layer and no OCR engine is loaded",
                page
            ))),
            None => Ok(embedded),
        }
    }
}

/// Build the text extractor selected by the configuration.
pub fn text_extractor_from_config(
    config: &SegrConfig,
) -> Result<Box<dyn PageTextExtractor>, OcrError> {
    match config.text.source {
        TextSource::Embedded => Ok(Box::new(EmbeddedTextExtractor)),
        TextSource::Ocr => ocr_extractor(config),
        TextSource::Auto => {
            let ocr = if config.ocr.models_present() {
                Some(ocr_extractor(config)?)
            } else {
                warn!(
                    "OCR models not found in {}, scanned pages will have no text",
                    config.ocr.model_dir.display()
                );
                None
            };
            Ok(Box::new(HybridTextExtractor::new(ocr, config.text.min_text_length)))
        }
    }
}

#[cfg(feature = "native")]
fn ocr_extractor(config: &SegrConfig) -> Result<Box<dyn PageTextExtractor>, OcrError> {
    Ok(Box::new(OcrTextExtractor::from_config(&config.ocr)?))
}

#[cfg(not(feature = "native"))]
fn ocr_extractor(_config: &SegrConfig) -> Result<Box<dyn PageTextExtractor>, OcrError> {
    Err(OcrError::Unavailable(
        "built without the `native` feature".to_string(),
    ))
}
