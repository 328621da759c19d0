//! Date extraction for PhonePe statements.

use chrono::NaiveDate;

use super::patterns::{DATE_DAY_MONTH_YEAR, DATE_DMY, DATE_ISO, DATE_MONTH_DAY_YEAR};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether the text holds at least one valid date token.
    pub fn contains_date(&self, text: &str) -> bool {
        self.extract(text).is_some()
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in [&*DATE_ISO, &*DATE_DMY, &*DATE_MONTH_DAY_YEAR, &*DATE_DAY_MONTH_YEAR] {
            for m in pattern.find_iter(text) {
                if let Some(date) = parse_statement_date(m.as_str()) {
                    results.push(
                        ExtractionMatch::new(date, m.as_str()).with_position(m.start(), m.end()),
                    );
                }
            }
        }

        results.sort_by_key(|r| r.position);
        results
    }
}

/// Parse a single date token in any supported statement layout.
///
/// Accepts `DD/MM/YYYY`, `DD-MM-YYYY`, `DD/MM/YY`, `YYYY-MM-DD`,
/// `Mon D, YYYY` and `D Mon YYYY`. Impossible calendar dates yield `None`.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Some(caps) = DATE_ISO.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DMY.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_MONTH_DAY_YEAR.captures(s) {
        let month = month_to_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DAY_MONTH_YEAR.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_to_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    // Two-digit years are always this century on PhonePe statements.
    if s.len() == 2 { Some(2000 + year) } else { Some(year) }
}

fn month_to_number(month: &str) -> Option<u32> {
    let month = month.trim_end_matches('.').to_lowercase();
    let number = match month.as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_numeric_dates() {
        assert_eq!(parse_statement_date("12/01/2024"), Some(date(2024, 1, 12)));
        assert_eq!(parse_statement_date("12-01-2024"), Some(date(2024, 1, 12)));
        assert_eq!(parse_statement_date("12/01/24"), Some(date(2024, 1, 12)));
        assert_eq!(parse_statement_date("2025-07-30"), Some(date(2025, 7, 30)));
    }

    #[test]
    fn test_parse_month_name_dates() {
        assert_eq!(parse_statement_date("Jul 16, 2025"), Some(date(2025, 7, 16)));
        assert_eq!(parse_statement_date("JULY 16 2025"), Some(date(2025, 7, 16)));
        assert_eq!(parse_statement_date("16 Jul 2025"), Some(date(2025, 7, 16)));
        assert_eq!(parse_statement_date("5 Sept 2024"), Some(date(2024, 9, 5)));
    }

    #[test]
    fn test_invalid_calendar_dates() {
        assert_eq!(parse_statement_date("31/02/2024"), None);
        assert_eq!(parse_statement_date("2024-13-01"), None);
        assert_eq!(parse_statement_date("Mayur 5, 2024"), None);
    }

    #[test]
    fn test_extract_all_in_position_order() {
        let extractor = DateExtractor::new();
        let found = extractor.extract_all("from 01 Jul 2025 to 2025-07-31");
        let values: Vec<_> = found.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![date(2025, 7, 1), date(2025, 7, 31)]);
    }

    #[test]
    fn test_contains_date() {
        let extractor = DateExtractor::new();
        assert!(extractor.contains_date("Jul 16, 2025 Paid to Swiggy"));
        assert!(!extractor.contains_date("Transaction ID T2507161032"));
        assert!(!extractor.contains_date("10:32 am"));
    }
}
