//! Tolerant numeric coercion.
//!
//! Two flavours mirror the two idioms in forecast documents: [`as_int`]
//! coerces whatever is there with a `0` fallback, [`parse_int`] accepts
//! only values whose text is a plain integer.

use serde_json::Value;

/// Coerce a node to an integer, defaulting to `0`.
///
/// Numbers truncate toward zero, numeric strings parse, booleans map to
/// 0/1, everything else yields the default.
#[must_use]
pub fn as_int(node: &Value) -> i64 {
    as_int_or(node, 0)
}

/// Coerce a node to an integer with an explicit default.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn as_int_or(node: &Value, default: i64) -> i64 {
    match node {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64))
            .unwrap_or(default),
        Value::Bool(b) => i64::from(*b),
        _ => default,
    }
}

/// Strict integer parse: integral numbers and integer-text strings only.
#[must_use]
pub fn parse_int(node: &Value) -> Option<i64> {
    match node {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn as_int_coerces_leniently() {
        assert_eq!(as_int(&json!(15)), 15);
        assert_eq!(as_int(&json!("15")), 15);
        assert_eq!(as_int(&json!(15.9)), 15);
        assert_eq!(as_int(&json!("not a number")), 0);
        assert_eq!(as_int(&json!(null)), 0);
        assert_eq!(as_int(&json!([1])), 0);
        assert_eq!(as_int_or(&json!({}), -1), -1);
    }

    #[test]
    fn parse_int_rejects_non_integers() {
        assert_eq!(parse_int(&json!(15)), Some(15));
        assert_eq!(parse_int(&json!("15")), Some(15));
        assert_eq!(parse_int(&json!(15.5)), None);
        assert_eq!(parse_int(&json!("15.5")), None);
        assert_eq!(parse_int(&json!(null)), None);
    }
}
