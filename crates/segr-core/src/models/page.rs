//! Per-page metadata and invoice keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for a field that was not found on a page.
pub const SENTINEL: &str = "0000";

/// Raw recognized text of one page, indexed from 0 in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Page index (0-based).
    pub index: usize,
    /// Recognized text. Empty when extraction failed.
    pub text: String,
}

impl PageText {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Billing metadata recovered from a single page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Last four digits of the account number, or [`SENTINEL`].
    pub account_number: String,
    /// Bill date as `MMYY`, or [`SENTINEL`].
    pub bill_date: String,
}

impl PageMetadata {
    pub fn new(account_number: impl Into<String>, bill_date: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            bill_date: bill_date.into(),
        }
    }

    /// Whether a bill date was recognized on the page.
    pub fn has_bill_date(&self) -> bool {
        self.bill_date != SENTINEL
    }

    /// Whether an account number was recognized on the page.
    pub fn has_account_number(&self) -> bool {
        self.account_number != SENTINEL
    }

    /// The invoice key this page would carry on its own.
    pub fn key(&self) -> InvoiceKey {
        InvoiceKey::new(self.account_number.clone(), self.bill_date.clone())
    }
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self::new(SENTINEL, SENTINEL)
    }
}

/// Identifies one invoice group.
///
/// Ordering compares the account number first, then the bill date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceKey {
    pub account_number: String,
    pub bill_date: String,
}

impl InvoiceKey {
    pub fn new(account_number: impl Into<String>, bill_date: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            bill_date: bill_date.into(),
        }
    }

    /// Key for pages of `account_number` whose date could not be resolved.
    pub fn unresolved(account_number: impl Into<String>) -> Self {
        Self::new(account_number, SENTINEL)
    }

    /// True for orphan groups.
    pub fn is_unresolved(&self) -> bool {
        self.bill_date == SENTINEL
    }
}

impl fmt::Display for InvoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_number, self.bill_date)
    }
}
