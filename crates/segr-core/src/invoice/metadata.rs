//! Per-page metadata extraction combining the field rules.

use serde::Serialize;

use super::rules::{AccountNumberExtractor, BillDateExtractor, FieldExtractor};
use crate::models::page::{PageMetadata, SENTINEL};

/// Parses one page's text into a [`PageMetadata`].
///
/// Extraction is a pure function of the text: the same input always yields
/// the same metadata.
pub struct MetadataExtractor {
    bill_date: BillDateExtractor,
    account_number: AccountNumberExtractor,
}

/// Every candidate field occurrence found on a page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageDiagnostics {
    /// Well-formed labeled bill dates, as `MMYY`.
    pub bill_dates: Vec<String>,
    /// Account number candidates, as last four digits.
    pub account_numbers: Vec<String>,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {
            bill_date: BillDateExtractor::new(),
            account_number: AccountNumberExtractor::new(),
        }
    }

    /// Extract account number and bill date, falling back to [`SENTINEL`].
    pub fn extract(&self, text: &str) -> PageMetadata {
        let bill_date = self
            .bill_date
            .extract(text)
            .map(|found| found.value.code())
            .unwrap_or_else(|| SENTINEL.to_string());

        let account_number = self
            .account_number
            .extract(text)
            .map(|found| found.value)
            .unwrap_or_else(|| SENTINEL.to_string());

        PageMetadata {
            account_number,
            bill_date,
        }
    }

    /// Collect all candidates, for inspecting pages that grouped unexpectedly.
    pub fn diagnose(&self, text: &str) -> PageDiagnostics {
        PageDiagnostics {
            bill_dates: self
                .bill_date
                .extract_all(text)
                .into_iter()
                .map(|found| found.value.code())
                .collect(),
            account_numbers: self
                .account_number
                .extract_all(text)
                .into_iter()
                .map(|found| found.value)
                .collect(),
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the metadata of a single page.
pub fn extract_metadata(text: &str) -> PageMetadata {
    MetadataExtractor::new().extract(text)
}
