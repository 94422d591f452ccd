//! Reusable field checks
//!
//! Predicates applied after a value has been coerced by a filter.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Missing for the purpose of a required rule: absent, null or blank text
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Email shape check
pub fn is_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

/// Inclusive numeric bounds; either side may be open
pub fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

/// Exact, case-sensitive membership
pub fn one_of(s: &str, allowed: &[&str]) -> bool {
    allowed.contains(&s)
}
