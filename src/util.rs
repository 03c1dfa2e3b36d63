// Utility helpers for parsing and basic statistics.
//
// Rig exports are noisy: padded cells, thousands separators, blank samples.
// Everything here turns a raw cell into `Option<T>` so callers only deal
// with typed values or an explicit gap.
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a sensor reading into `f64`.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts exponent notation (`1.5e3`); rejects `NaN` and infinities.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Join the `YYYY/MM/DD` and `HH:MM:SS` cells and parse them.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
}

/// Arithmetic mean over the present values; `None` if there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().reduce(f64::max)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.56`).
    let s = format!("{:.*}", decimals, n.abs());
    // Sign follows the rounded value so `-0.001` prints as `0.00`.
    let neg = n.is_sign_negative() && s.chars().any(|c| matches!(c, '1'..='9'));
    let mut parts = s.split('.');
    let int_val: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parses_padded_and_grouped_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("-3")), Some(-3.0));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("1.5e3")), Some(1500.0));
        assert_eq!(parse_f64_safe(Some("-2E-1")), Some(-0.2));
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn timestamp_accepts_slash_and_dash_dates() {
        let ts = parse_timestamp("2023/04/01", "13:05:09").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
        assert_eq!(ts.hour(), 13);
        assert!(parse_timestamp("2023-04-01", "00:00:00").is_some());
        assert!(parse_timestamp("04/01/2023", "00:00:00").is_none());
        assert!(parse_timestamp("2023/04/01", "25:00:00").is_none());
    }

    #[test]
    fn mean_skips_gaps() {
        assert_eq!(mean([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean(Vec::<Option<f64>>::new()), None);
        assert_eq!(mean([None, None]), None);
    }

    #[test]
    fn max_skips_gaps() {
        assert_eq!(max([Some(1.0), None, Some(7.5), Some(2.0)]), Some(7.5));
        assert_eq!(max([None]), None);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(-0.4, 0), "0");
        assert_eq!(format_number(-0.005, 3), "-0.005");
        assert_eq!(format_optional(None, 2), "n/a");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
