use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_PREFIX: Regex = Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})").expect("valid regex");
    static ref DATE_HEADER: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex");
    static ref SWEDISH_DATE: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(januari|februari|mars|april|maj|juni|juli|augusti|september|oktober|november|december)\s+(\d{4})\b"
    )
    .expect("valid regex");
}

fn swedish_month(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januari" => 1,
        "februari" => 2,
        "mars" => 3,
        "april" => 4,
        "maj" => 5,
        "juni" => 6,
        "juli" => 7,
        "augusti" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// `"16 september 2025"`, anywhere in the text.
pub fn parse_swedish_date(text: &str) -> Option<NaiveDate> {
    let caps = SWEDISH_DATE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = swedish_month(&caps[2])?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// RFC 3339 timestamps, `2025-10-09 06:00:00Z` and bare `2025-10-09`.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    let caps = ISO_PREFIX.captures(text)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

pub fn parse_any_date(text: &str) -> Option<NaiveDate> {
    parse_iso_date(text).or_else(|| parse_swedish_date(text))
}

/// A heading that is nothing but a date, as used to group archive listings.
pub fn is_date_header(text: &str) -> bool {
    DATE_HEADER.is_match(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_swedish_dates() {
        assert_eq!(parse_swedish_date("16 september 2025"), Some(date(2025, 9, 16)));
        assert_eq!(parse_swedish_date("Publicerad 3 Maj 2024 kl 08:00"), Some(date(2024, 5, 3)));
        assert_eq!(parse_swedish_date("31 februari 2025"), None);
        assert_eq!(parse_swedish_date("16 september"), None);
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_iso_date("2025-10-09 06:00:00Z"), Some(date(2025, 10, 9)));
        assert_eq!(parse_iso_date("2025-10-09T06:00:00+02:00"), Some(date(2025, 10, 9)));
        assert_eq!(parse_iso_date(" 2025-09-16 "), Some(date(2025, 9, 16)));
        assert_eq!(parse_iso_date("igår"), None);
    }

    #[test]
    fn test_parse_any_date() {
        assert_eq!(parse_any_date("2025-09-16"), Some(date(2025, 9, 16)));
        assert_eq!(parse_any_date("1 oktober 2025"), Some(date(2025, 10, 1)));
        assert_eq!(parse_any_date(""), None);
    }

    #[test]
    fn test_date_header() {
        assert!(is_date_header("2025-09-16"));
        assert!(is_date_header(" 2025-09-16\n"));
        assert!(!is_date_header("2025-09-16 Nyheter"));
        assert!(!is_date_header("Nyheter"));
    }
}
