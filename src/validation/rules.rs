//! Constrained-value rules. Each returns the narrowed value or a message
//! that the caller prefixes with the field name.
//!
//! Numbers are coerced from numeric strings because multipart forms and
//! query strings only carry text.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

pub fn any_text(v: &Value) -> Result<String, String> {
    match v {
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err("must be a string".into()),
    }
}

/// Non-empty string with a character count in `min..=max` (after trimming).
pub fn text(v: &Value, min: usize, max: usize) -> Result<String, String> {
    let s = any_text(v)?;
    let len = s.chars().count();
    if len < min {
        return Err(format!("must be at least {} characters", min));
    }
    if len > max {
        return Err(format!("must be at most {} characters", max));
    }
    Ok(s)
}

pub fn integer(v: &Value) -> Result<i64, String> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err("must be a whole number".into()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| "must be a whole number".into()),
        _ => Err("must be a whole number".into()),
    }
}

pub fn int_range(v: &Value, min: i64, max: i64) -> Result<i64, String> {
    let n = integer(v)?;
    if n < min || n > max {
        return Err(format!("must be between {} and {}", min, max));
    }
    Ok(n)
}

/// Like [`int_range`] but narrowed to `i32`, the width of every integer column.
pub fn int32_range(v: &Value, min: i32, max: i32) -> Result<i32, String> {
    int_range(v, min as i64, max as i64).map(|n| n as i32)
}

/// Positive integer id or index (1 and up).
pub fn positive_id(v: &Value) -> Result<i64, String> {
    match integer(v)? {
        n if n >= 1 => Ok(n),
        _ => Err("must be a positive integer".into()),
    }
}

/// Boolean-like flag: 0/1 as numbers or text, JSON booleans, "true"/"false".
pub fn bit(v: &Value) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        _ => match integer(v) {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            _ => Err("must be 0 or 1".into()),
        },
    }
}

/// ISO-8601 / RFC 3339 date-time with offset.
pub fn datetime(v: &Value) -> Result<DateTime<Utc>, String> {
    let s = any_text(v)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| "must be an ISO-8601 date-time".into())
}

pub fn uuid(v: &Value) -> Result<Uuid, String> {
    let s = any_text(v)?;
    Uuid::parse_str(&s).map_err(|_| "must be a valid UUID".into())
}

/// One of an enumerated set; `names` is only used for the message.
pub fn choice<T: FromStr>(v: &Value, names: &[&str]) -> Result<T, String> {
    let s = any_text(v)?;
    s.parse::<T>()
        .map_err(|_| format!("must be one of: {}", names.join(", ")))
}

fn isbn_pattern() -> Result<&'static Regex, String> {
    static ISBN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    ISBN.get_or_init(|| Regex::new(r"^(?:\d{9}[\dX]|\d{13})$"))
        .as_ref()
        .map_err(|e| format!("cannot be checked: {}", e))
}

/// ISBN-10 or ISBN-13; hyphens and spaces are dropped from the stored value.
pub fn isbn(v: &Value) -> Result<String, String> {
    let raw = any_text(v)?;
    let normalized: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if !isbn_pattern()?.is_match(&normalized) {
        return Err("must be a valid ISBN-10 or ISBN-13".into());
    }
    Ok(normalized)
}
