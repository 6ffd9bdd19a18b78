use chrono::NaiveDate;

use crate::types::MonthKey;

/// Formats that carry a full calendar date.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Numeric month-only formats, matched by prefixing or suffixing a day of 1.
const MONTH_FORMATS: &[(&str, &str, &str)] = &[
    // (prefix, suffix, format)
    ("", "-01", "%Y-%m-%d"),
    ("", "/01", "%Y/%m/%d"),
    ("01/", "", "%d/%m/%Y"),
];

/// Named-month formats, tried after `-`, `/` and `.` separators are turned
/// into spaces. Two-digit year first: %Y would read "23" as the year 23.
const NAMED_MONTH_FORMATS: &[&str] = &["%d %b %y", "%d %B %Y"];

/// Years accepted on the month axis.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2200;

/// Interpret a column header as a month on the axis.
///
/// Accepts `2023-01`, `2023-01-31`, `2023/01`, `01/2023`, `1/31/2023`,
/// `Jan 2023`, `January 2023`, `Jan-2023`, `January-2024` and `Jan-23`.
/// Returns `None` for anything else (e.g. a "Segment" column) and for years
/// outside 1900-2200.
pub fn parse_month_header(raw: &str) -> Option<MonthKey> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let parsed = if s.chars().any(|c| c.is_ascii_alphabetic()) {
        parse_named_month(s)
    } else {
        parse_numeric_month(s)
    };
    parsed.filter(|key| YEAR_RANGE.contains(&key.year))
}

fn parse_numeric_month(s: &str) -> Option<MonthKey> {
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(MonthKey::from_date(d));
        }
    }

    MONTH_FORMATS.iter().find_map(|(prefix, suffix, fmt)| {
        NaiveDate::parse_from_str(&format!("{prefix}{s}{suffix}"), fmt)
            .ok()
            .map(MonthKey::from_date)
    })
}

fn parse_named_month(s: &str) -> Option<MonthKey> {
    let normalized: String = s
        .chars()
        .map(|c| if matches!(c, '-' | '/' | '.') { ' ' } else { c })
        .collect();
    let candidate = format!("01 {}", normalized.split_whitespace().collect::<Vec<_>>().join(" "));

    NAMED_MONTH_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(&candidate, fmt)
            .ok()
            .map(MonthKey::from_date)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_month() {
        assert_eq!(parse_month_header("2023-01"), Some(MonthKey::new(2023, 1)));
        assert_eq!(parse_month_header(" 2023-11 "), Some(MonthKey::new(2023, 11)));
    }

    #[test]
    fn test_full_dates_map_to_their_month() {
        assert_eq!(parse_month_header("2023-03-31"), Some(MonthKey::new(2023, 3)));
        assert_eq!(parse_month_header("3/31/2023"), Some(MonthKey::new(2023, 3)));
        assert_eq!(parse_month_header("2023/04/15"), Some(MonthKey::new(2023, 4)));
    }

    #[test]
    fn test_slash_month_year() {
        assert_eq!(parse_month_header("2023/07"), Some(MonthKey::new(2023, 7)));
        assert_eq!(parse_month_header("07/2023"), Some(MonthKey::new(2023, 7)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_month_header("Jan 2023"), Some(MonthKey::new(2023, 1)));
        assert_eq!(parse_month_header("February 2024"), Some(MonthKey::new(2024, 2)));
        assert_eq!(parse_month_header("Dec-22"), Some(MonthKey::new(2022, 12)));
        assert_eq!(parse_month_header("Jan-23"), Some(MonthKey::new(2023, 1)));
    }

    #[test]
    fn test_hyphenated_four_digit_years() {
        assert_eq!(parse_month_header("Jan-2023"), Some(MonthKey::new(2023, 1)));
        assert_eq!(parse_month_header("January-2024"), Some(MonthKey::new(2024, 1)));
        assert_eq!(parse_month_header("Mar/2023"), Some(MonthKey::new(2023, 3)));
    }

    #[test]
    fn test_hyphenated_headers_cross_year_boundary() {
        let dec = parse_month_header("Dec-22").unwrap();
        let jan = parse_month_header("Jan-23").unwrap();
        assert_eq!(dec.next(), jan);
    }

    #[test]
    fn test_years_outside_range_rejected() {
        assert_eq!(parse_month_header("Jan 0023"), None);
        assert_eq!(parse_month_header("1850-01"), None);
    }

    #[test]
    fn test_non_month_headers() {
        assert_eq!(parse_month_header("Customer"), None);
        assert_eq!(parse_month_header("Segment"), None);
        assert_eq!(parse_month_header(""), None);
        assert_eq!(parse_month_header("2023-13"), None);
    }
}
