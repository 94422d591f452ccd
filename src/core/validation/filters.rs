//! Value coercion filters
//!
//! Each filter turns a raw JSON request value into the typed value that gets
//! stored, or `None` when the input cannot represent that type. Clients send
//! form-style strings as often as native JSON, so `"16"` and `16` both pass.

use mongodb::bson::oid::ObjectId;
use serde_json::Value;

use crate::core::id;

/// Text is stored verbatim; only JSON strings qualify
pub fn to_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// JSON number or numeric string to a float
///
/// Strings must be plain decimal literals: signs and one decimal point are
/// allowed, exponents and words like `NaN` are not.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            if !is_decimal_literal(s) {
                return None;
            }
            s.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Integral JSON number or integer string
pub fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

/// Native boolean or the literal strings `true` / `false` in any case
pub fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Embedded identifier reference
pub fn to_object_id(value: &Value) -> Option<ObjectId> {
    value.as_str().and_then(id::decode)
}

fn is_decimal_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}
