//! Typed field values and string coercion
//!
//! XML carries every value as text. Field values are widened into the
//! narrowest matching type in a fixed order: integer, float, boolean, string.

use serde::Serialize;
use std::fmt;

/// A typed metric field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl FieldValue {
    /// Name of the variant, used in trace logging
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::String(_) => "string",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

/// Boolean literals accepted by [`coerce`], compared case-insensitively
const BOOL_TRUE: &[&str] = &["true", "t", "1"];
const BOOL_FALSE: &[&str] = &["false", "f", "0"];

/// Convert raw text into the narrowest matching [`FieldValue`]
///
/// Precedence is integer, then float, then boolean, then the unmodified
/// string. The input is not trimmed.
pub fn coerce(raw: &str) -> FieldValue {
    if let Ok(i) = raw.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Some(f) = parse_float(raw) {
        return FieldValue::Float(f);
    }
    if let Some(b) = parse_bool(raw) {
        return FieldValue::Boolean(b);
    }
    FieldValue::String(raw.to_string())
}

/// Parse a float, rejecting finite literals that overflow to infinity
fn parse_float(raw: &str) -> Option<f64> {
    let f = raw.parse::<f64>().ok()?;
    if f.is_infinite() && !is_infinity_literal(raw) {
        return None;
    }
    Some(f)
}

fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn parse_bool(raw: &str) -> Option<bool> {
    if BOOL_TRUE.iter().any(|lit| raw.eq_ignore_ascii_case(lit)) {
        Some(true)
    } else if BOOL_FALSE.iter().any(|lit| raw.eq_ignore_ascii_case(lit)) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coerce_precedence() {
        assert_eq!(coerce("42"), FieldValue::Integer(42));
        assert_eq!(coerce("42.0"), FieldValue::Float(42.0));
        assert_eq!(coerce("true"), FieldValue::Boolean(true));
        assert_eq!(coerce("42abc"), FieldValue::String("42abc".to_string()));
    }

    #[test]
    fn test_kind() {
        assert_eq!(coerce("3").kind(), "integer");
        assert_eq!(coerce("3.5").kind(), "float");
        assert_eq!(coerce("f").kind(), "boolean");
        assert_eq!(coerce("up").kind(), "string");
    }

    #[test]
    fn test_coerce_integers() {
        assert_eq!(coerce("-17"), FieldValue::Integer(-17));
        assert_eq!(coerce("+8"), FieldValue::Integer(8));
        assert_eq!(coerce("0"), FieldValue::Integer(0));
        assert_eq!(coerce("9223372036854775807"), FieldValue::Integer(i64::MAX));
    }

    #[test]
    fn test_integer_overflow_widens_to_float() {
        assert_eq!(coerce("9223372036854775808"), FieldValue::Float(9223372036854775808.0));
    }

    #[test]
    fn test_coerce_floats() {
        assert_eq!(coerce("3.5"), FieldValue::Float(3.5));
        assert_eq!(coerce("-1e3"), FieldValue::Float(-1000.0));
        assert_eq!(coerce(".5"), FieldValue::Float(0.5));
        assert_eq!(coerce("inf"), FieldValue::Float(f64::INFINITY));
        assert!(coerce("NaN").as_f64().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_float_overflow_is_string() {
        assert_eq!(coerce("1e400"), FieldValue::String("1e400".to_string()));
    }

    #[test]
    fn test_coerce_booleans() {
        assert_eq!(coerce("TRUE"), FieldValue::Boolean(true));
        assert_eq!(coerce("False"), FieldValue::Boolean(false));
        assert_eq!(coerce("t"), FieldValue::Boolean(true));
        assert_eq!(coerce("F"), FieldValue::Boolean(false));
        // numeric literals never reach the boolean step
        assert_eq!(coerce("1"), FieldValue::Integer(1));
    }

    #[test]
    fn test_coerce_does_not_trim() {
        assert_eq!(coerce("  5  "), FieldValue::String("  5  ".to_string()));
        assert_eq!(coerce(" true"), FieldValue::String(" true".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Integer(3).to_string(), "3");
        assert_eq!(FieldValue::Float(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::Boolean(false).to_string(), "false");
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
    }

    proptest! {
        #[test]
        fn test_any_i64_coerces_to_integer(n in any::<i64>()) {
            prop_assert_eq!(coerce(&n.to_string()), FieldValue::Integer(n));
        }

        #[test]
        fn test_alphabetic_text_is_kept_verbatim(s in "[g-z]{2,12}") {
            prop_assert_eq!(coerce(&s), FieldValue::String(s.clone()));
        }
    }
}
