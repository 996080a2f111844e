//! Lenient field decoders.
//!
//! Stores in the field send numbers as strings and dates as full timestamps. These decoders
//! accept both forms on input; output always uses the strict form.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number(raw: NumberOrString) -> Result<f64, String> {
    match raw {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("expected a number, got {s:?}")),
    }
}

/// Finite `f64` from a JSON number or numeric string.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = number(NumberOrString::deserialize(deserializer)?).map_err(de::Error::custom)?;
    if !value.is_finite() {
        return Err(de::Error::custom("expected a finite number"));
    }
    Ok(value)
}

/// Whole non-negative `u32` from a JSON number or numeric string.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = number(NumberOrString::deserialize(deserializer)?).map_err(de::Error::custom)?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!(
            "expected a whole non-negative number, got {value}"
        )));
    }
    Ok(value as u32)
}

/// Calendar date from `YYYY-MM-DD` or an ISO-8601 timestamp, which is truncated to its date.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| de::Error::custom(format!("expected a date, got {raw:?}")))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = match raw.get(10..11) {
        Some("T") | Some(" ") => raw.get(..10)?,
        Some(_) => return None,
        None => raw,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
