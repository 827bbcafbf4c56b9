//! Text conversions at the CLI boundary.

use chrono::NaiveDate;

/// Format a date as `YYYY-MM-DD`.
#[inline]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_dates(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().copied().map(format_date).collect()
}

/// Parse `YYYY-MM-DD`, or `YYYY-MM` as the first of the month.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d"))
        .ok()
}

/// Parse a price cell; empty, non-numeric and non-finite cells become None.
#[inline]
pub fn parse_value(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let jan = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(parse_month("2023-01-01"), Some(jan));
        assert_eq!(parse_month(" 2023-01 "), Some(jan));
        assert_eq!(
            parse_month("2023-01-15"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(parse_month("Jan 2023"), None);
        assert_eq!(parse_month(""), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("412.5"), Some(412.5));
        assert_eq!(parse_value(" 7 "), Some(7.0));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("n/a"), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(d), "2024-03-01");
        assert_eq!(format_dates(&[d]), vec!["2024-03-01".to_string()]);
    }
}
