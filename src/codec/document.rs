//! Dynamic documents exchanged with the REST API
//!
//! Numbers keep the exact text they were written or received with
//! (`serde_json` is built with `arbitrary_precision`), so each target kind
//! parses them on its own terms: decimals exactly, floats to the nearest
//! `f64`, integers only when integral and in range.

use super::{AttributePath, CodecError};
use rust_decimal::Decimal;
use serde_json::{Map, Number};
use std::collections::BTreeMap;
use std::str::FromStr;

/// JSON-shaped wire value
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Document>),
    Mapping(BTreeMap<String, Document>),
}

/// Top-level request or response body
pub type DocumentMap = BTreeMap<String, Document>;

impl Document {
    /// Name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "sequence",
            Document::Mapping(_) => "mapping",
        }
    }

    /// Convert a parsed JSON value
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CodecError> {
        from_json_at(value, &AttributePath::root())
    }

    /// Convert to JSON for a request body
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Document::Null => serde_json::Value::Null,
            Document::Bool(b) => serde_json::Value::Bool(*b),
            Document::Number(n) => serde_json::Value::Number(n.clone()),
            Document::String(s) => serde_json::Value::String(s.clone()),
            Document::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Document::to_json).collect())
            }
            Document::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, serde_json::Value>>(),
            ),
        }
    }
}

/// Response body as a mapping. An empty (`null`) body is an empty mapping.
pub fn mapping_from_json(value: &serde_json::Value) -> Result<DocumentMap, CodecError> {
    match Document::from_json(value)? {
        Document::Mapping(entries) => Ok(entries),
        Document::Null => Ok(DocumentMap::new()),
        other => Err(CodecError::structural_mismatch(
            &AttributePath::root(),
            "mapping",
            &other,
        )),
    }
}

/// Request body as JSON
pub fn mapping_to_json(entries: &DocumentMap) -> serde_json::Value {
    serde_json::Value::Object(
        entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

fn from_json_at(value: &serde_json::Value, path: &AttributePath) -> Result<Document, CodecError> {
    Ok(match value {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(*b),
        serde_json::Value::Number(n) => Document::Number(n.clone()),
        serde_json::Value::String(s) => Document::String(s.clone()),
        serde_json::Value::Array(items) => Document::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json_at(item, &path.index(i)))
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(entries) => Document::Mapping(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), from_json_at(v, &path.attribute(k))?)))
                .collect::<Result<_, CodecError>>()?,
        ),
    })
}

/// Wire form of a decimal, digit for digit
pub fn decimal_to_number(d: &Decimal) -> Option<Number> {
    serde_json::from_str(&d.to_string()).ok()
}

/// Shortest wire form of a finite float
pub fn float_to_number(f: f64) -> Option<Number> {
    Number::from_f64(f)
}

/// Exact decimal for numeric text, failing rather than rounding when the
/// value needs more than 28 fractional digits or 96 bits of mantissa
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let plain = expand_exponent(text.trim())?;
    Decimal::from_str_exact(&plain).ok().or_else(|| {
        // 1.50000000000000000000000000000 still fits once trailing zeros go
        let trimmed = plain
            .contains('.')
            .then(|| plain.trim_end_matches('0').trim_end_matches('.'))?;
        Decimal::from_str_exact(trimmed).ok()
    })
}

/// Rewrite `1.25e-3` as `0.00125` without going through a float
fn expand_exponent(text: &str) -> Option<String> {
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return Some(text.to_string());
    };
    let exponent: i32 = exponent.parse().ok()?;
    if exponent.unsigned_abs() > 64 {
        return None;
    }

    let (sign, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let all_digits = format!("{}{}", int_part, frac_part);
    let point = int_part.len() as i64 + i64::from(exponent);
    let plain = if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), all_digits)
    } else if point as usize >= all_digits.len() {
        format!("{}{}", all_digits, "0".repeat(point as usize - all_digits.len()))
    } else {
        let (whole, frac) = all_digits.split_at(point as usize);
        format!("{}.{}", whole, frac)
    };
    Some(format!("{}{}", sign, plain))
}

/// Nearest finite float for numeric text
pub fn parse_f64(text: &str) -> Option<f64> {
    f64::from_str(text).ok().filter(|f| f.is_finite())
}
