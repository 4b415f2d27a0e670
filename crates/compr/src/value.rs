//! Dynamic value semantics shared by the built-in predicates.
//!
//! Values are `serde_json::Value`s. Equality is numeric-aware (`1 == 1.0`, and
//! booleans count as 0/1), ordering is only defined between numbers, strings and
//! arrays, and every unsupported combination is reported as a [`CompareError`]
//! instead of silently returning `false`.

use crate::error::{CompareError, Result};
use serde_json::Value;
use std::cmp::Ordering;

/// Short type label used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numeric view of a value. Integers are kept exact, everything else is `f64`.
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Int(i128),
    Float(f64),
}

impl Numeric {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Numeric::Int(i128::from(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Numeric::Int(i128::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Some(Numeric::Int(i128::from(u)))
                } else {
                    n.as_f64().map(Numeric::Float)
                }
            }
            _ => None,
        }
    }

    fn order(self, other: Numeric) -> Ordering {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
            (Numeric::Int(a), Numeric::Float(b)) => int_float_order(a, b),
            (Numeric::Float(a), Numeric::Int(b)) => int_float_order(b, a).reverse(),
            // serde_json never holds NaN, so partial_cmp always succeeds
            (Numeric::Float(a), Numeric::Float(b)) => {
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        }
    }
}

/// Exact order of an integer against a finite float, without rounding the integer.
fn int_float_order(int: i128, float: f64) -> Ordering {
    // i128::MIN is -2^127 and exactly representable; i128::MAX rounds up to 2^127.
    if float >= i128::MAX as f64 {
        return Ordering::Less;
    }
    if float < i128::MIN as f64 {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

/// Equality with numeric coercion, applied recursively through arrays and objects.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (Numeric::of(left), Numeric::of(right)) {
        return a.order(b) == Ordering::Equal;
    }
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| loose_eq(v, other)))
        }
        _ => left == right,
    }
}

/// Total order between two values of compatible types.
///
/// Arrays compare lexicographically: the first unequal pair of elements decides,
/// otherwise the shorter array is smaller.
pub fn compare(left: &Value, right: &Value) -> Result<Ordering> {
    if let (Some(a), Some(b)) = (Numeric::of(left), Numeric::of(right)) {
        return Ok(a.order(b));
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b) {
                if !loose_eq(x, y) {
                    return compare(x, y);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(CompareError::Unorderable {
            left: type_name(left).to_string(),
            right: type_name(right).to_string(),
        }),
    }
}

/// Membership test: is `needle` inside `container`?
///
/// Strings test for substrings, arrays for an equal element and objects for a key.
pub fn contains(container: &Value, needle: &Value) -> Result<bool> {
    match container {
        Value::String(haystack) => match needle {
            Value::String(n) => Ok(haystack.contains(n.as_str())),
            other => Err(CompareError::TypeMismatch {
                op: "string membership",
                expected: "a string needle",
                got: type_name(other).to_string(),
            }),
        },
        Value::Array(items) => Ok(items.iter().any(|item| loose_eq(item, needle))),
        Value::Object(map) => match needle {
            Value::String(key) => Ok(map.contains_key(key)),
            Value::Array(_) | Value::Object(_) => Err(CompareError::TypeMismatch {
                op: "key membership",
                expected: "a scalar key",
                got: type_name(needle).to_string(),
            }),
            _ => Ok(false),
        },
        other => Err(CompareError::NotAContainer(type_name(other).to_string())),
    }
}

/// Length of a string (in characters), array or object.
pub fn len(value: &Value) -> Result<usize> {
    match value {
        Value::String(s) => Ok(s.chars().count()),
        Value::Array(items) => Ok(items.len()),
        Value::Object(map) => Ok(map.len()),
        other => Err(CompareError::Unsized(type_name(other).to_string())),
    }
}

/// Borrow a value as `&str` or fail with a type mismatch for `op`.
pub(crate) fn expect_str<'a>(value: &'a Value, op: &'static str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| CompareError::TypeMismatch {
        op,
        expected: "a string",
        got: type_name(value).to_string(),
    })
}
