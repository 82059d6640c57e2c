//! Purchase date extraction.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use super::patterns::{DATE_ISO, DATE_MDY};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Candidate patterns with the format their match is parsed with, in
    /// priority order.
    fn candidates() -> [(&'static Regex, &'static str); 2] {
        [(&*DATE_MDY, "%m/%d/%Y"), (&*DATE_ISO, "%Y-%m-%d")]
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    /// First match of each pattern only; a match that does not parse moves
    /// on to the next pattern.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        for (pattern, format) in Self::candidates() {
            let Some(m) = pattern.find(text) else {
                continue;
            };

            match NaiveDate::parse_from_str(m.as_str(), format) {
                Ok(date) => {
                    return Some(
                        ExtractionMatch::new(date, m.as_str()).with_position(m.start(), m.end()),
                    );
                }
                Err(e) => debug!("Date candidate {:?} rejected: {}", m.as_str(), e),
            }
        }

        None
    }
}

/// Extract the purchase date as `YYYY-MM-DD`, or an empty string.
pub fn extract_date(text: &str) -> String {
    DateExtractor::new()
        .extract(text)
        .map(|m| m.value.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_date() {
        assert_eq!(extract_date("03/15/2024 14:02 REG 3"), "2024-03-15");
        assert_eq!(extract_date("Date: 3/5/2024"), "2024-03-05");
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(extract_date("Order 2024-01-07"), "2024-01-07");
    }

    #[test]
    fn test_us_date_wins_over_iso() {
        assert_eq!(extract_date("2024-01-07\n03/15/2024"), "2024-03-15");
    }

    #[test]
    fn test_unparseable_us_date_falls_through_to_iso() {
        assert_eq!(extract_date("15/03/2024\n2024-03-15"), "2024-03-15");
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_date("no date here"), "");
        assert_eq!(extract_date("13/45/2024"), "");
    }
}
