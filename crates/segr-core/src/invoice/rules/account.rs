//! Account number extraction.

use super::patterns::ACCOUNT_NUMBER;
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for account numbers printed as `dddd dddd dddd`.
///
/// The value is the last four digits; no checksum is applied.
pub struct AccountNumberExtractor;

impl AccountNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AccountNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AccountNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ACCOUNT_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                Some(
                    ExtractionMatch::new(caps[3].to_string(), full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Extract the last four digits of the first account number on a page.
pub fn extract_account_number(text: &str) -> Option<String> {
    AccountNumberExtractor::new()
        .extract(text)
        .map(|found| found.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_account_number() {
        assert_eq!(
            extract_account_number("Account number 1234 5678 9012"),
            Some("9012".to_string())
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "Ref 1111 2222 3333\nAccount 4444 5555 6666";
        assert_eq!(extract_account_number(text), Some("3333".to_string()));

        let all = AccountNumberExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].value, "6666");
        assert_eq!(all[1].source, "4444 5555 6666");
    }

    #[test]
    fn test_no_account_number() {
        assert_eq!(extract_account_number("Account 1234-5678-9012"), None);
        assert_eq!(extract_account_number(""), None);
    }

    #[test]
    fn test_longer_digit_runs_do_not_match() {
        assert_eq!(extract_account_number("Card 1234 5678 9012 3456"), Some("9012".to_string()));
        assert_eq!(extract_account_number("91234 5678 9012"), None);
    }
}
