//! Lenient coercion of GeoJSON attribute values.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Numeric value of an attribute, `None` when it is missing or not a number.
///
/// Numeric strings are accepted; anything else (including locale-specific
/// decimal commas) is treated as missing.
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Join key of an attribute: strings as-is, integral numbers without a
/// trailing `.0`.
pub fn coerce_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

/// Calendar year of a commissioning date attribute.
///
/// Accepts ISO dates, ISO/RFC 3339 timestamps, Swiss `dd.mm.yyyy` dates and a
/// bare year (string or integer).
pub fn coerce_year(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .filter(|y| (1800..=2200).contains(y))
            .map(|y| y as i32),
        Value::String(s) => parse_year(s.trim()),
        _ => None,
    }
}

fn parse_year(text: &str) -> Option<i32> {
    if text.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.year());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts.year());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.year());
        }
    }
    if text.len() == 4 {
        return text.parse::<i32>().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn power_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_f64(Some(&json!(12.5))), Some(12.5));
        assert_eq!(coerce_f64(Some(&json!(" 7 "))), Some(7.0));
        assert_eq!(coerce_f64(Some(&json!("7,5"))), None);
        assert_eq!(coerce_f64(Some(&json!(null))), None);
        assert_eq!(coerce_f64(None), None);
    }

    #[test]
    fn keys_drop_float_suffix() {
        assert_eq!(coerce_key(Some(&json!(21))).as_deref(), Some("21"));
        assert_eq!(coerce_key(Some(&json!(21.0))).as_deref(), Some("21"));
        assert_eq!(coerce_key(Some(&json!("Carouge"))).as_deref(), Some("Carouge"));
        assert_eq!(coerce_key(Some(&json!(""))), None);
    }

    #[test]
    fn years_from_common_date_shapes() {
        assert_eq!(coerce_year(Some(&json!("2015-06-30"))), Some(2015));
        assert_eq!(coerce_year(Some(&json!("2019-01-01T00:00:00"))), Some(2019));
        assert_eq!(coerce_year(Some(&json!("2021-03-04T10:00:00+01:00"))), Some(2021));
        assert_eq!(coerce_year(Some(&json!("30.06.2012"))), Some(2012));
        assert_eq!(coerce_year(Some(&json!("2008"))), Some(2008));
        assert_eq!(coerce_year(Some(&json!(2010))), Some(2010));
        assert_eq!(coerce_year(Some(&json!("unknown"))), None);
        assert_eq!(coerce_year(Some(&json!(null))), None);
    }
}
