//! Common regex patterns for billing metadata extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Bill date" label, up to 10 separator characters, then "Mon D, YYYY".
    // Matching is case-insensitive throughout; month casing is checked when parsing.
    pub static ref BILL_DATE: Regex = Regex::new(
        r"(?i)Bill\s*date[^a-zA-Z0-9]{0,10}(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{1,2}),\s+(\d{4})"
    ).unwrap();

    // Account number printed as three space-separated 4-digit groups
    pub static ref ACCOUNT_NUMBER: Regex = Regex::new(
        r"\b(\d{4}) (\d{4}) (\d{4})\b"
    ).unwrap();
}
