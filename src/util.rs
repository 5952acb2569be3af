// Utility helpers for parsing dates and numbers out of CSV text.
//
// This module centralizes the "dirty" field handling so the cleaner and the
// loader can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Spellings treated as a missing value, on top of the empty string.
pub const NULL_SENTINELS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

pub fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || NULL_SENTINELS.contains(&s)
}

/// Parse an integer, also accepting an integral float rendering such as
/// `10024.0` (what spreadsheet exports produce for a column with gaps).
pub fn parse_integral(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    // Beyond 2^53 an f64 no longer holds every integer exactly.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

// Dates serialized with a zero time component still name a plain date.
fn strip_midnight(s: &str) -> &str {
    [" 00:00:00", "T00:00:00", " 00:00"]
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .unwrap_or(s)
}

/// Parse an ISO `YYYY-MM-DD` date. The year must be written with four
/// digits so `21-02-01` is not mistaken for the year 21.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = strip_midnight(s.trim());
    let b = s.as_bytes();
    if b.len() < 8 || !b[..4].iter().all(u8::is_ascii_digit) || b[4] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a date with day-before-month disambiguation.
///
/// - `D/M/YYYY`, `D-M-YYYY` and `D.M.YYYY`, one or two digits for day and month.
/// - Two-digit years pivot like chrono's `%y`: `00..=68` is 20xx, `69..=99` is 19xx.
/// - ISO `YYYY-MM-DD` is accepted as-is, year-first being unambiguous.
/// - There is no month-first fallback: `12/25/2020` is rejected.
/// - Year-first is only read in the dashed ISO form; `2017/11/08` is rejected,
///   as is any time of day other than midnight.
pub fn parse_date_dayfirst(s: &str) -> Option<NaiveDate> {
    let s = strip_midnight(s.trim());
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_iso_date(s) {
        return Some(d);
    }
    let sep = s.chars().find(|c| matches!(c, '/' | '-' | '.'))?;
    let parts: Vec<&str> = s.split(sep).collect();
    let [d, m, y] = parts[..] else {
        return None;
    };
    let numeric = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !(numeric(d) && numeric(m) && numeric(y)) || d.len() > 2 || m.len() > 2 {
        return None;
    }
    let day: u32 = d.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    let year: i32 = match y.len() {
        4 => y.parse().ok()?,
        2 => {
            let yy: i32 = y.parse().ok()?;
            if yy < 69 {
                2000 + yy
            } else {
                1900 + yy
            }
        }
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages, e.g. `9,855 rows`.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_comes_before_month() {
        assert_eq!(parse_date_dayfirst("01/02/2021"), Some(ymd(2021, 2, 1)));
        assert_eq!(parse_date_dayfirst("03/04/2020"), Some(ymd(2020, 4, 3)));
        assert_eq!(parse_date_dayfirst("8/11/2017"), Some(ymd(2017, 11, 8)));
        assert_eq!(parse_date_dayfirst("13-06-2016"), Some(ymd(2016, 6, 13)));
        assert_eq!(parse_date_dayfirst("13.06.2016"), Some(ymd(2016, 6, 13)));
        assert_eq!(parse_date_dayfirst("13/06/16"), Some(ymd(2016, 6, 13)));
    }

    #[test]
    fn iso_dates_round_trip() {
        assert_eq!(parse_date_dayfirst("2021-02-01"), Some(ymd(2021, 2, 1)));
        assert_eq!(parse_date_dayfirst("2021-02-01 00:00:00"), Some(ymd(2021, 2, 1)));
        assert_eq!(parse_iso_date("21-02-01"), None);
    }

    #[test]
    fn rejects_month_first_and_garbage() {
        assert_eq!(parse_date_dayfirst("12/25/2020"), None);
        assert_eq!(parse_date_dayfirst("31/02/2020"), None);
        assert_eq!(parse_date_dayfirst(""), None);
        assert_eq!(parse_date_dayfirst("yesterday"), None);
        assert_eq!(parse_date_dayfirst("1/2/3/2020"), None);
        assert_eq!(parse_date_dayfirst("01/02/202"), None);
    }

    #[test]
    fn rejects_year_first_with_slashes_and_clock_times() {
        assert_eq!(parse_date_dayfirst("2017/11/08"), None);
        assert_eq!(parse_date_dayfirst("08/11/2017 14:30"), None);
        assert_eq!(parse_date_dayfirst("2017-11-08 14:30:00"), None);
    }

    #[test]
    fn integral_values() {
        assert_eq!(parse_integral("42"), Some(42));
        assert_eq!(parse_integral(" 10024.0 "), Some(10024));
        assert_eq!(parse_integral("1.5"), None);
        assert_eq!(parse_integral("9O210"), None);
    }

    #[test]
    fn null_spellings() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("NaN"));
        assert!(is_missing("N/A"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn formats_counts_with_separators() {
        assert_eq!(format_int(9855usize), "9,855");
    }
}
