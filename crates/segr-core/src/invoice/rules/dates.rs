//! Bill date extraction.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use regex::Captures;
use tracing::warn;

use super::patterns::BILL_DATE;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// A parsed bill date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillDate(pub NaiveDate);

impl BillDate {
    /// `MMYY` code: zero-padded month followed by the last two digits of the year.
    pub fn code(&self) -> String {
        format!("{:02}{:02}", self.0.month(), self.0.year() % 100)
    }
}

impl fmt::Display for BillDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Extractor for the labeled "Bill date" field.
pub struct BillDateExtractor;

impl BillDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BillDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BillDateExtractor {
    type Output = ExtractionMatch<BillDate>;

    /// Only the first labeled date in the text is considered. If it does not
    /// form a valid calendar date, or the month is not written as `Jan`..`Dec`,
    /// the field is treated as absent.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = BILL_DATE.captures(text)?;
        match to_match(&caps) {
            Ok(found) => Some(found),
            Err(e) => {
                warn!("Bill date parse error: {}", e);
                None
            }
        }
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        BILL_DATE
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps).ok())
            .collect()
    }
}

/// Extract the bill date of a page as an `MMYY` code.
pub fn extract_bill_date(text: &str) -> Option<String> {
    BillDateExtractor::new()
        .extract(text)
        .map(|found| found.value.code())
}

fn to_match(caps: &Captures<'_>) -> Result<ExtractionMatch<BillDate>, ExtractionError> {
    let date = parse_date(&caps[1], &caps[2], &caps[3])?;

    // Group 0 includes the label; keep only the date part as the source.
    let (full, month) = match (caps.get(0), caps.get(1)) {
        (Some(full), Some(month)) => (full, month),
        _ => {
            return Err(ExtractionError::Parse {
                field: "bill date".to_string(),
                value: caps[0].to_string(),
            })
        }
    };
    let source = &full.as_str()[month.start() - full.start()..];

    Ok(ExtractionMatch::new(BillDate(date), source).with_position(month.start(), full.end()))
}

fn parse_date(month: &str, day: &str, year: &str) -> Result<NaiveDate, ExtractionError> {
    let raw = format!("{} {}, {}", month, day, year);
    let invalid = || ExtractionError::Parse {
        field: "bill date".to_string(),
        value: raw.clone(),
    };

    let month = month_to_number(month).ok_or_else(invalid)?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    if year < 1 {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

// The label is case-insensitive, the month abbreviation is not.
fn month_to_number(month: &str) -> Option<u32> {
    match month {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "Mar" => Some(3),
        "Apr" => Some(4),
        "May" => Some(5),
        "Jun" => Some(6),
        "Jul" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}
