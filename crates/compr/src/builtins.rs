//! Built-in predicate set and the constructors that bind them.
//!
//! Every predicate takes the actual value first and its expected arguments after.
//! The multi-argument predicates (`within`, `match_all`, `match_any`,
//! `contains_dict` and the `eq_*` aliases) are registered as variadic factories,
//! so a single array handed over by the kwargs parser arrives as separate
//! arguments. The predicates themselves never unpack.

use crate::comparator::{Comparator, Factory};
use crate::error::{CompareError, Result};
use crate::registry::{default_factory, Registry};
use crate::value::{compare, contains as value_contains, expect_str, len, loose_eq, type_name};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

type Builtin = fn(&Value, &[Value]) -> Result<bool>;

/// Registration order. It is also the alternation order of the parser's suffix pattern.
const BUILTINS: &[(&str, Builtin)] = &[
    ("within", predicates::within),
    ("contains", predicates::contains),
    ("one_of", predicates::one_of),
    ("lt", predicates::lt),
    ("gt", predicates::gt),
    ("le", predicates::le),
    ("ge", predicates::ge),
    ("ne", predicates::ne),
    ("eq_all", predicates::match_all),
    ("eq_any", predicates::match_any),
    ("re_search", predicates::re_search),
    ("re_match", predicates::re_match),
    ("endswith", predicates::endswith),
    ("eq", predicates::eq),
    ("contains_dict", predicates::contains_dict),
    ("startswith", predicates::startswith),
    ("shorter_than", predicates::shorter_than),
    ("longer_than", predicates::longer_than),
    ("match_all", predicates::match_all),
    ("match_any", predicates::match_any),
];

/// Built-ins whose parsed array value is spread into separate arguments.
const VARIADIC: &[&str] = &[
    "within",
    "contains_dict",
    "eq_all",
    "eq_any",
    "match_all",
    "match_any",
];

fn builtin(name: &'static str, predicate: Builtin) -> Factory {
    let factory = Factory::new(name, predicate);
    if VARIADIC.contains(&name) {
        factory.variadic()
    } else {
        factory
    }
}

pub(crate) fn install(registry: &mut Registry) {
    for (name, predicate) in BUILTINS {
        registry.insert(builtin(*name, *predicate));
    }
}

/// Compiled patterns shared by `re_search` and `re_match`, keyed by final pattern text.
static PATTERNS: Lazy<RwLock<HashMap<String, Arc<Regex>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

const PATTERN_CACHE_LIMIT: usize = 64;

fn compiled(pattern: &str) -> Result<Arc<Regex>> {
    if let Some(regex) = PATTERNS.read().get(pattern) {
        return Ok(Arc::clone(regex));
    }
    let regex = Arc::new(Regex::new(pattern)?);
    let mut cache = PATTERNS.write();
    if cache.len() < PATTERN_CACHE_LIMIT {
        cache.insert(pattern.to_string(), Arc::clone(&regex));
    }
    Ok(regex)
}

mod predicates {
    use super::*;

    fn one<'a>(name: &'static str, args: &'a [Value]) -> Result<&'a Value> {
        match args {
            [arg] => Ok(arg),
            _ => Err(CompareError::Arity {
                name,
                expected: "1",
                got: args.len(),
            }),
        }
    }

    pub(super) fn within(actual: &Value, args: &[Value]) -> Result<bool> {
        match args {
            [lower, upper] => {
                if compare(lower, actual)?.is_gt() {
                    return Ok(false);
                }
                Ok(compare(actual, upper)?.is_le())
            }
            other => Err(CompareError::Arity {
                name: "within",
                expected: "2",
                got: other.len(),
            }),
        }
    }

    pub(super) fn contains(actual: &Value, args: &[Value]) -> Result<bool> {
        value_contains(actual, one("contains", args)?)
    }

    pub(super) fn one_of(actual: &Value, args: &[Value]) -> Result<bool> {
        value_contains(one("one_of", args)?, actual)
    }

    pub(super) fn lt(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(compare(actual, one("lt", args)?)?.is_lt())
    }

    pub(super) fn gt(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(compare(actual, one("gt", args)?)?.is_gt())
    }

    pub(super) fn le(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(compare(actual, one("le", args)?)?.is_le())
    }

    pub(super) fn ge(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(compare(actual, one("ge", args)?)?.is_ge())
    }

    pub(super) fn eq(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(loose_eq(actual, one("eq", args)?))
    }

    pub(super) fn ne(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(!loose_eq(actual, one("ne", args)?))
    }

    pub(super) fn match_all(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(args.iter().all(|expected| loose_eq(actual, expected)))
    }

    pub(super) fn match_any(actual: &Value, args: &[Value]) -> Result<bool> {
        Ok(args.iter().any(|expected| loose_eq(actual, expected)))
    }

    /// Prefix/suffix test against one string or any of an array of strings.
    fn affix(
        op: &'static str,
        actual: &Value,
        args: &[Value],
        test: fn(&str, &str) -> bool,
    ) -> Result<bool> {
        let actual = expect_str(actual, op)?;
        match one(op, args)? {
            Value::Array(options) => {
                for option in options {
                    if test(actual, expect_str(option, op)?) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            expected => Ok(test(actual, expect_str(expected, op)?)),
        }
    }

    pub(super) fn startswith(actual: &Value, args: &[Value]) -> Result<bool> {
        affix("startswith", actual, args, |s, p| s.starts_with(p))
    }

    pub(super) fn endswith(actual: &Value, args: &[Value]) -> Result<bool> {
        affix("endswith", actual, args, |s, p| s.ends_with(p))
    }

    pub(super) fn shorter_than(actual: &Value, args: &[Value]) -> Result<bool> {
        let limit = one("shorter_than", args)?;
        Ok(compare(&Value::from(len(actual)?), limit)?.is_lt())
    }

    pub(super) fn longer_than(actual: &Value, args: &[Value]) -> Result<bool> {
        let limit = one("longer_than", args)?;
        Ok(compare(&Value::from(len(actual)?), limit)?.is_gt())
    }

    pub(super) fn re_search(actual: &Value, args: &[Value]) -> Result<bool> {
        let pattern = expect_str(one("re_search", args)?, "re_search")?;
        let haystack = expect_str(actual, "re_search")?;
        Ok(compiled(pattern)?.is_match(haystack))
    }

    pub(super) fn re_match(actual: &Value, args: &[Value]) -> Result<bool> {
        let pattern = expect_str(one("re_match", args)?, "re_match")?;
        let haystack = expect_str(actual, "re_match")?;
        // Anchored at the start only, the rest of the string may follow.
        Ok(compiled(&format!(r"\A(?:{pattern})"))?.is_match(haystack))
    }

    /// Collect the expected sub-mapping: one object, or any number of `[key, value]`
    /// pair arguments. Later keys win.
    fn expected_mapping(args: &[Value]) -> Result<Map<String, Value>> {
        if let [Value::Object(map)] = args {
            return Ok(map.clone());
        }
        let mut mapping = Map::new();
        for pair in args {
            match pair {
                Value::Array(kv) if kv.len() == 2 => {
                    let key = expect_str(&kv[0], "contains_dict key")?;
                    mapping.insert(key.to_string(), kv[1].clone());
                }
                other => {
                    return Err(CompareError::TypeMismatch {
                        op: "contains_dict",
                        expected: "an object or [key, value] pairs",
                        got: type_name(other).to_string(),
                    })
                }
            }
        }
        Ok(mapping)
    }

    pub(super) fn contains_dict(actual: &Value, args: &[Value]) -> Result<bool> {
        let expected = expected_mapping(args)?;
        if expected.is_empty() {
            return Ok(true);
        }
        let Value::Object(actual) = actual else {
            return Err(CompareError::TypeMismatch {
                op: "contains_dict",
                expected: "an object",
                got: type_name(actual).to_string(),
            });
        };
        Ok(expected
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|found| loose_eq(found, value))))
    }
}

/// Resolve a built-in through the default registry so re-registration is honored.
fn resolve(name: &'static str, fallback: Builtin) -> Factory {
    default_factory(name).unwrap_or_else(|| builtin(name, fallback))
}

/// `lower <= actual <= upper`, both ends inclusive.
pub fn within(lower: impl Into<Value>, upper: impl Into<Value>) -> Comparator {
    resolve("within", predicates::within).bind([lower.into(), upper.into()])
}

/// Actual contains `member` (substring, element or key).
pub fn contains(member: impl Into<Value>) -> Comparator {
    resolve("contains", predicates::contains).call1(member)
}

/// Actual is a member of `collection`.
pub fn one_of(collection: impl Into<Value>) -> Comparator {
    resolve("one_of", predicates::one_of).call1(collection)
}

pub fn lt(bound: impl Into<Value>) -> Comparator {
    resolve("lt", predicates::lt).call1(bound)
}

pub fn gt(bound: impl Into<Value>) -> Comparator {
    resolve("gt", predicates::gt).call1(bound)
}

pub fn le(bound: impl Into<Value>) -> Comparator {
    resolve("le", predicates::le).call1(bound)
}

pub fn ge(bound: impl Into<Value>) -> Comparator {
    resolve("ge", predicates::ge).call1(bound)
}

pub fn eq(expected: impl Into<Value>) -> Comparator {
    resolve("eq", predicates::eq).call1(expected)
}

pub fn ne(expected: impl Into<Value>) -> Comparator {
    resolve("ne", predicates::ne).call1(expected)
}

/// Prefix test; `prefix` may be a string or an array of candidate strings.
pub fn startswith(prefix: impl Into<Value>) -> Comparator {
    resolve("startswith", predicates::startswith).call1(prefix)
}

/// Suffix test; `suffix` may be a string or an array of candidate strings.
pub fn endswith(suffix: impl Into<Value>) -> Comparator {
    resolve("endswith", predicates::endswith).call1(suffix)
}

pub fn shorter_than(length: impl Into<Value>) -> Comparator {
    resolve("shorter_than", predicates::shorter_than).call1(length)
}

pub fn longer_than(length: impl Into<Value>) -> Comparator {
    resolve("longer_than", predicates::longer_than).call1(length)
}

/// `pattern` matches anywhere in the actual string.
pub fn re_search(pattern: &str) -> Comparator {
    resolve("re_search", predicates::re_search).call1(pattern)
}

/// `pattern` matches at the start of the actual string.
pub fn re_match(pattern: &str) -> Comparator {
    resolve("re_match", predicates::re_match).call1(pattern)
}

/// Every entry of `expected` is present in the actual object with an equal value.
///
/// `expected` is an object or an array of `[key, value]` pairs.
pub fn contains_dict(expected: impl Into<Value>) -> Comparator {
    resolve("contains_dict", predicates::contains_dict).call1(expected)
}

/// Actual equals every one of `values`.
pub fn match_all<I, V>(values: I) -> Comparator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    resolve("match_all", predicates::match_all).bind(values)
}

/// Actual equals at least one of `values`.
pub fn match_any<I, V>(values: I) -> Comparator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    resolve("match_any", predicates::match_any).bind(values)
}

pub fn eq_all<I, V>(values: I) -> Comparator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    resolve("eq_all", predicates::match_all).bind(values)
}

pub fn eq_any<I, V>(values: I) -> Comparator
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    resolve("eq_any", predicates::match_any).bind(values)
}
