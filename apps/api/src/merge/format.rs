//! Value formatter — total, pure rendering of raw backend values for legal documents.
//!
//! Nothing here fails: input that cannot be parsed for the requested type is passed
//! through as its plain string form.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::models::variable::FormatType;

const ID_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const NUMBER_FRACTION_DIGITS: i32 = 3;
const PHONE_MIN_SUBSCRIBER_DIGITS: usize = 8;

pub fn format_value(value: &Value, format: FormatType) -> String {
    if value.is_null() {
        return String::new();
    }

    match format {
        FormatType::Text => stringify(value),
        FormatType::Uppercase => stringify(value).to_uppercase(),
        FormatType::Lowercase => stringify(value).to_lowercase(),
        FormatType::Date => match parse_date(value) {
            Some(date) => format!(
                "{} {} {}",
                date.day(),
                ID_MONTHS[date.month0() as usize],
                date.year()
            ),
            None => stringify(value),
        },
        FormatType::DateJp => match parse_date(value) {
            Some(date) => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
            None => stringify(value),
        },
        FormatType::Currency => match parse_number(value) {
            Some(n) => signed_whole(&n, |digits| format!("Rp {}", group_digits(digits, '.'))),
            None => stringify(value),
        },
        FormatType::CurrencyJp => match parse_number(value) {
            Some(n) => signed_whole(&n, |digits| format!("¥{}", group_digits(digits, ','))),
            None => stringify(value),
        },
        FormatType::Number => match parse_number(value) {
            Some(Numeric::Float(f)) => format_decimal(f),
            Some(n) => signed_whole(&n, |digits| group_digits(digits, '.')),
            None => stringify(value),
        },
        FormatType::Phone => format_phone(value),
    }
}

/// Plain string form of a raw value.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        other => other.to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    n.as_f64()
        .map(|f| f.to_string())
        .unwrap_or_else(|| n.to_string())
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

/// Integers stay exact; only fractional or exponent input goes through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Integer(i128),
    Float(f64),
}

fn parse_number(value: &Value) -> Option<Numeric> {
    let n = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Numeric::Integer(i.into()));
            }
            if let Some(u) = n.as_u64() {
                return Some(Numeric::Integer(u.into()));
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i128>() {
                return Some(Numeric::Integer(i));
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(Numeric::Float(n))
}

/// Whole-number rendering rounded half away from zero. `-` is prefixed only when the
/// value does not round to zero.
fn signed_whole(n: &Numeric, render: impl Fn(&str) -> String) -> String {
    let (negative, digits) = match *n {
        Numeric::Integer(i) => (i < 0, i.unsigned_abs().to_string()),
        Numeric::Float(f) => {
            let rounded = f.abs().round();
            (f < 0.0 && rounded != 0.0, format!("{rounded:.0}"))
        }
    };
    let body = render(&digits);
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Indonesian grouping: `.` thousands, `,` decimals, up to three fraction digits.
fn format_decimal(n: f64) -> String {
    let scale = 10f64.powi(NUMBER_FRACTION_DIGITS);
    let scaled = (n.abs() * scale).round();
    // Past the scaled range the fraction is lost anyway.
    let fixed = if scaled.is_finite() {
        format!("{:.*}", NUMBER_FRACTION_DIGITS as usize, scaled / scale)
    } else {
        format!("{:.0}", n.abs())
    };
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut body = group_digits(whole, '.');
    if !fraction.is_empty() {
        body.push(',');
        body.push_str(fraction);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if n < 0.0 && !is_zero {
        format!("-{body}")
    } else {
        body
    }
}

/// `+62 XXX-XXXX-XXXX` for numbers carrying the Indonesian country code. Anything else,
/// including numbers too short to fill the first two groups, is returned as given.
fn format_phone(value: &Value) -> String {
    let raw = stringify(value);
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.strip_prefix("62") {
        Some(rest) if rest.len() >= PHONE_MIN_SUBSCRIBER_DIGITS => {
            let (area, rest) = rest.split_at(rest.len().min(3));
            let (middle, tail) = rest.split_at(rest.len().min(4));
            format!("+62 {area}-{middle}-{tail}")
        }
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_FORMATS: [FormatType; 9] = [
        FormatType::Text,
        FormatType::Date,
        FormatType::DateJp,
        FormatType::Currency,
        FormatType::CurrencyJp,
        FormatType::Uppercase,
        FormatType::Lowercase,
        FormatType::Number,
        FormatType::Phone,
    ];

    #[test]
    fn test_null_is_empty_for_every_format() {
        for format in ALL_FORMATS {
            assert_eq!(format_value(&Value::Null, format), "", "{format:?}");
        }
    }

    #[test]
    fn test_text_stringifies_scalars() {
        assert_eq!(format_value(&json!("Ahmad"), FormatType::Text), "Ahmad");
        assert_eq!(format_value(&json!(42), FormatType::Text), "42");
        assert_eq!(format_value(&json!(1.5), FormatType::Text), "1.5");
        assert_eq!(format_value(&json!(true), FormatType::Text), "true");
    }

    #[test]
    fn test_date_indonesian_long_form() {
        assert_eq!(
            format_value(&json!("2024-08-17"), FormatType::Date),
            "17 Agustus 2024"
        );
        assert_eq!(
            format_value(&json!("2025-01-01"), FormatType::Date),
            "1 Januari 2025"
        );
    }

    #[test]
    fn test_date_from_timestamp_uses_its_own_offset() {
        assert_eq!(
            format_value(&json!("2024-08-17T23:30:00+07:00"), FormatType::Date),
            "17 Agustus 2024"
        );
        assert_eq!(
            format_value(&json!("2024-12-31T10:00:00.000Z"), FormatType::Date),
            "31 Desember 2024"
        );
        assert_eq!(
            format_value(&json!("2024-03-05 08:00:00"), FormatType::Date),
            "5 Maret 2024"
        );
    }

    #[test]
    fn test_date_from_epoch_millis() {
        // 2024-08-17T00:00:00Z
        assert_eq!(
            format_value(&json!(1_723_852_800_000i64), FormatType::Date),
            "17 Agustus 2024"
        );
    }

    #[test]
    fn test_unparsable_date_passes_through() {
        assert_eq!(format_value(&json!("besok"), FormatType::Date), "besok");
        assert_eq!(format_value(&json!("N/A"), FormatType::DateJp), "N/A");
    }

    #[test]
    fn test_date_jp_has_no_padding() {
        assert_eq!(
            format_value(&json!("2024-08-07"), FormatType::DateJp),
            "2024年8月7日"
        );
        assert_eq!(
            format_value(&json!("2024/11/23"), FormatType::DateJp),
            "2024年11月23日"
        );
    }

    #[test]
    fn test_currency_rupiah() {
        assert_eq!(format_value(&json!("150000"), FormatType::Currency), "Rp 150.000");
        assert_eq!(format_value(&json!(1_500_000), FormatType::Currency), "Rp 1.500.000");
        assert_eq!(format_value(&json!(0), FormatType::Currency), "Rp 0");
        assert_eq!(format_value(&json!("999"), FormatType::Currency), "Rp 999");
    }

    #[test]
    fn test_currency_rounds_half_away_from_zero() {
        assert_eq!(format_value(&json!(1500.5), FormatType::Currency), "Rp 1.501");
        assert_eq!(format_value(&json!(-1500), FormatType::Currency), "-Rp 1.500");
        assert_eq!(format_value(&json!(-0.2), FormatType::Currency), "Rp 0");
    }

    #[test]
    fn test_unparsable_currency_passes_through() {
        assert_eq!(
            format_value(&json!("not-a-number"), FormatType::Currency),
            "not-a-number"
        );
        assert_eq!(format_value(&json!("NaN"), FormatType::Currency), "NaN");
        assert_eq!(format_value(&json!(""), FormatType::Currency), "");
    }

    #[test]
    fn test_currency_jp() {
        assert_eq!(
            format_value(&json!("1500000"), FormatType::CurrencyJp),
            "¥1,500,000"
        );
        assert_eq!(format_value(&json!(180000.4), FormatType::CurrencyJp), "¥180,000");
    }

    #[test]
    fn test_number_grouping_and_decimals() {
        assert_eq!(format_value(&json!(1234567), FormatType::Number), "1.234.567");
        assert_eq!(format_value(&json!("1234.5"), FormatType::Number), "1.234,5");
        assert_eq!(format_value(&json!(0.12345), FormatType::Number), "0,123");
        assert_eq!(format_value(&json!(-42), FormatType::Number), "-42");
        assert_eq!(format_value(&json!("12a"), FormatType::Number), "12a");
    }

    #[test]
    fn test_integers_beyond_f64_precision_stay_exact() {
        assert_eq!(
            format_value(&json!("12345678901234567"), FormatType::Currency),
            "Rp 12.345.678.901.234.567"
        );
        assert_eq!(
            format_value(&json!(9_007_199_254_740_993u64), FormatType::Number),
            "9.007.199.254.740.993"
        );
        assert_eq!(
            format_value(&json!("3201234567890123"), FormatType::Number),
            "3.201.234.567.890.123"
        );
        assert_eq!(
            format_value(&json!(u64::MAX), FormatType::CurrencyJp),
            "¥18,446,744,073,709,551,615"
        );
        assert_eq!(
            format_value(&json!("-9007199254740993"), FormatType::Currency),
            "-Rp 9.007.199.254.740.993"
        );
    }

    fn assert_grouped_whole(formatted: &str) {
        let groups: Vec<&str> = formatted.split('.').collect();
        assert!(groups.len() > 100, "{formatted}");
        assert!((1..=3).contains(&groups[0].len()), "{formatted}");
        assert!(groups[1..].iter().all(|g| g.len() == 3), "{formatted}");
        assert!(groups.iter().all(|g| g.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_huge_decimal_never_renders_inf() {
        let formatted = format_value(&json!("1e306"), FormatType::Number);
        assert_grouped_whole(&formatted);

        let negative = format_value(&json!(-1.5e307), FormatType::Number);
        let digits = negative.strip_prefix('-').expect("negative sign");
        assert_grouped_whole(digits);
    }

    #[test]
    fn test_case_transforms() {
        assert_eq!(format_value(&json!("Toyota Corp"), FormatType::Uppercase), "TOYOTA CORP");
        assert_eq!(format_value(&json!("Toyota Corp"), FormatType::Lowercase), "toyota corp");
    }

    #[test]
    fn test_phone_with_country_code() {
        assert_eq!(
            format_value(&json!("6281234567890"), FormatType::Phone),
            "+62 812-3456-7890"
        );
        assert_eq!(
            format_value(&json!("+62 (812) 3456-7890"), FormatType::Phone),
            "+62 812-3456-7890"
        );
    }

    #[test]
    fn test_phone_too_short_to_group_is_unchanged() {
        assert_eq!(format_value(&json!("62"), FormatType::Phone), "62");
        assert_eq!(format_value(&json!("62812"), FormatType::Phone), "62812");
        assert_eq!(
            format_value(&json!("+62 812-345"), FormatType::Phone),
            "+62 812-345"
        );
        assert_eq!(format_value(&json!("628123456"), FormatType::Phone), "628123456");
        assert_eq!(
            format_value(&json!("6281234567"), FormatType::Phone),
            "+62 812-3456-7"
        );
    }

    #[test]
    fn test_phone_without_country_code_unchanged() {
        assert_eq!(
            format_value(&json!("081234567890"), FormatType::Phone),
            "081234567890"
        );
        assert_eq!(
            format_value(&json!("0812-3456-7890"), FormatType::Phone),
            "0812-3456-7890"
        );
    }

    #[test]
    fn test_format_is_deterministic() {
        for format in ALL_FORMATS {
            let a = format_value(&json!("2024-08-17"), format);
            let b = format_value(&json!("2024-08-17"), format);
            assert_eq!(a, b);
        }
    }
}
