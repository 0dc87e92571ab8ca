//! Turning invoice groups into output files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PdfError, Result, SegrError};
use crate::grouping::{InvoiceGroup, InvoiceGroups};
use crate::invoice::MetadataExtractor;
use crate::models::config::{GroupOrder, OutputConfig};
use crate::models::page::{InvoiceKey, PageText, SENTINEL};
use crate::pdf::PdfSplitter;

/// One output file to be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOutput {
    pub key: InvoiceKey,
    /// Bill date used in the file name.
    pub bill_date: String,
    pub file_name: String,
    /// Pages in source order.
    pub pages: Vec<usize>,
}

/// Output file name for a group.
pub fn output_filename(bill_date: &str, account_number: &str) -> String {
    format!("{}_{}.pdf", bill_date, account_number)
}

/// Writes one PDF per invoice group.
pub struct GroupMaterializer {
    extractor: MetadataExtractor,
    config: OutputConfig,
}

impl GroupMaterializer {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            extractor: MetadataExtractor::new(),
            config,
        }
    }

    /// Bill date of the first page, in page order, whose own text carries one.
    ///
    /// Metadata is derived again from each page's text rather than taken from
    /// the group key.
    pub fn resolve_bill_date(&self, pages: &[usize], texts: &[PageText]) -> String {
        let mut sorted = pages.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        sorted
            .into_iter()
            .filter_map(|page| texts.get(page))
            .map(|page| self.extractor.extract(&page.text))
            .find(|meta| meta.has_bill_date())
            .map(|meta| meta.bill_date)
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    /// Output files for all groups, in the configured order.
    pub fn plan(&self, groups: &InvoiceGroups, texts: &[PageText]) -> Vec<PlannedOutput> {
        let ordered: Vec<&InvoiceGroup> = match self.config.order {
            GroupOrder::FirstSeen => groups.iter().collect(),
            GroupOrder::Key => groups.sorted_by_key(),
        };

        ordered
            .into_iter()
            .map(|group| {
                let mut pages = group.pages.clone();
                pages.sort_unstable();
                pages.dedup();

                let bill_date = self.resolve_bill_date(&pages, texts);
                let file_name = output_filename(&bill_date, &group.key.account_number);
                PlannedOutput {
                    key: group.key.clone(),
                    bill_date,
                    file_name,
                    pages,
                }
            })
            .collect()
    }

    /// Write every group to `output_dir`, returning the created paths.
    ///
    /// Files written before a failure are left in place.
    pub fn materialize<S: PdfSplitter>(
        &self,
        source: &S,
        groups: &InvoiceGroups,
        texts: &[PageText],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir).map_err(|source| SegrError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let planned = self.plan(groups, texts);
        let mut saved = Vec::with_capacity(planned.len());

        for output in planned {
            let path = output_dir.join(&output.file_name);

            if !self.config.overwrite && path.exists() {
                return Err(SegrError::Write {
                    path,
                    reason: "file already exists".to_string(),
                });
            }

            source
                .write_pages(&output.pages, &path)
                .map_err(|e| match e {
                    PdfError::Save { path, reason } => SegrError::Write { path, reason },
                    other => SegrError::Pdf(other),
                })?;

            debug!("{} -> {} ({} pages)", output.key, path.display(), output.pages.len());
            saved.push(path);
        }

        info!("Wrote {} files to {}", saved.len(), output_dir.display());
        Ok(saved)
    }
}

impl Default for GroupMaterializer {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
