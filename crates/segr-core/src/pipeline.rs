//! End-to-end segregation of one source document.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::grouping::{group_pages_with_fallback, InvoiceGroups};
use crate::invoice::{MetadataExtractor, PageDiagnostics};
use crate::materialize::{GroupMaterializer, PlannedOutput};
use crate::models::config::SegrConfig;
use crate::models::page::{PageMetadata, PageText};
use crate::ocr::{text_extractor_from_config, PageTextExtractor};
use crate::pdf::{PdfDocument, PdfSplitter};

/// Metadata recovered for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub index: usize,
    pub text_length: usize,
    pub metadata: PageMetadata,
    pub candidates: PageDiagnostics,
}

/// Everything decided about a document, without writing any files.
#[derive(Debug, Clone, Serialize)]
pub struct SegregationReport {
    pub source: PathBuf,
    pub page_count: usize,
    pub pages: Vec<PageReport>,
    pub groups: InvoiceGroups,
    pub outputs: Vec<PlannedOutput>,
}

/// Intermediate state shared by `analyze` and `process`.
struct Analysis {
    document: PdfDocument,
    texts: Vec<PageText>,
    metadata: Vec<PageMetadata>,
    groups: InvoiceGroups,
}

/// Splits a multi-invoice document into one PDF per invoice.
pub struct Segregator {
    text_extractor: Box<dyn PageTextExtractor>,
    metadata: MetadataExtractor,
    materializer: GroupMaterializer,
}

impl Segregator {
    /// Create a segregator whose text source follows the configuration.
    pub fn new(config: &SegrConfig) -> Result<Self> {
        let text_extractor = text_extractor_from_config(config)?;
        Ok(Self::with_text_extractor(config, text_extractor))
    }

    /// Create a segregator with an explicit text source.
    pub fn with_text_extractor(
        config: &SegrConfig,
        text_extractor: Box<dyn PageTextExtractor>,
    ) -> Self {
        Self {
            text_extractor,
            metadata: MetadataExtractor::new(),
            materializer: GroupMaterializer::new(config.output.clone()),
        }
    }

    fn run_analysis(&self, document_path: &Path) -> Result<Analysis> {
        let document = PdfDocument::open(document_path)?;
        info!(
            "Extracting text from {} ({} pages)",
            document_path.display(),
            document.page_count()
        );

        let texts = self.text_extractor.extract_document(&document);
        let metadata: Vec<PageMetadata> = texts
            .iter()
            .map(|page| self.metadata.extract(&page.text))
            .collect();

        info!("Grouping pages with neighbor fallback");
        let groups = group_pages_with_fallback(&metadata);
        debug_assert!(groups.is_partition_of(document.page_count()));

        Ok(Analysis {
            document,
            texts,
            metadata,
            groups,
        })
    }

    /// Recover metadata and groups and plan output files, writing nothing.
    pub fn analyze(&self, document_path: &Path) -> Result<SegregationReport> {
        let analysis = self.run_analysis(document_path)?;
        let outputs = self.materializer.plan(&analysis.groups, &analysis.texts);

        let pages = analysis
            .texts
            .iter()
            .zip(analysis.metadata)
            .map(|(page, metadata)| PageReport {
                index: page.index,
                text_length: page.text.len(),
                metadata,
                candidates: self.metadata.diagnose(&page.text),
            })
            .collect();

        Ok(SegregationReport {
            source: document_path.to_path_buf(),
            page_count: analysis.document.page_count(),
            pages,
            groups: analysis.groups,
            outputs,
        })
    }

    /// Write one PDF per invoice group into `output_dir`.
    ///
    /// Returns the created files in write order. `output_dir` is created if
    /// it does not exist.
    pub fn process(&self, document_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let start = Instant::now();
        let analysis = self.run_analysis(document_path)?;

        info!("Writing {} invoice files", analysis.groups.len());
        let saved = self.materializer.materialize(
            &analysis.document,
            &analysis.groups,
            &analysis.texts,
            output_dir,
        )?;

        info!(
            "Done: {} files saved in {} ({:?})",
            saved.len(),
            output_dir.display(),
            start.elapsed()
        );
        Ok(saved)
    }
}

/// Split `document_path` into `output_dir` using the default configuration.
pub fn process(document_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    Segregator::new(&SegrConfig::default())?.process(document_path, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PdfError, SegrError};
    use crate::ocr::EmbeddedTextExtractor;
    use crate::pdf::fixtures;
    use pretty_assertions::assert_eq;

    fn embedded() -> Segregator {
        Segregator::with_text_extractor(&SegrConfig::default(), Box::new(EmbeddedTextExtractor))
    }

    fn batch() -> Vec<u8> {
        fixtures::text_pdf(&[
            "Bill date: Jan 5, 2024\nAccount 1234 5678 1111",
            "Page 2\nAccount 1234 5678 1111",
            "Bill date: Jan 7, 2024\nAccount 9999 8888 2222",
            "Terms and conditions",
            "Page 2\nAccount 1234 5678 3333",
            "Bill date: Feb 1, 2024\nAccount 1234 5678 3333",
        ])
    }

    #[test]
    fn test_process_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch.pdf");
        std::fs::write(&input, batch()).unwrap();
        let out_dir = dir.path().join("out");

        let saved = embedded().process(&input, &out_dir).unwrap();
        let names: Vec<_> = saved
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["0124_1111.pdf", "0124_2222.pdf", "0000_0000.pdf", "0224_3333.pdf"]
        );

        let total: usize = saved
            .iter()
            .map(|p| PdfDocument::open(p).unwrap().page_count())
            .sum();
        assert_eq!(total, 6);

        let last = PdfDocument::open(&saved[3]).unwrap();
        assert!(last.page_text(0).unwrap().contains("Page 2"));
        assert!(last.page_text(1).unwrap().contains("Feb 1, 2024"));
    }

    #[test]
    fn test_analyze_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch.pdf");
        std::fs::write(&input, batch()).unwrap();

        let report = embedded().analyze(&input).unwrap();
        assert_eq!(report.page_count, 6);
        assert_eq!(report.pages[0].metadata, PageMetadata::new("1111", "0124"));
        assert_eq!(report.pages[3].metadata, PageMetadata::default());
        assert_eq!(report.outputs.len(), 4);
        assert!(report.groups.is_partition_of(6));

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outputs"][0]["file_name"], "0124_1111.pdf");
        assert_eq!(json["groups"][0]["pages"], serde_json::json!([0, 1]));
    }

    #[test]
    fn test_unreadable_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"%PDF-1.5 truncated").unwrap();

        let err = embedded().process(&input, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, SegrError::Pdf(PdfError::Open { .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_scanned_pages_without_text_stay_partitioned() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.pdf");
        std::fs::write(&input, fixtures::scanned_pdf(3)).unwrap();

        let saved = embedded().process(&input, &dir.path().join("out")).unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].ends_with("0000_0000.pdf"));
        assert_eq!(PdfDocument::open(&saved[0]).unwrap().page_count(), 3);
    }
}
