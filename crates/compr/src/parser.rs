//! Keyword-argument parsing: `<field>_<comparator>: value` into field checks.
//!
//! Each key is matched in full against `^(\w+)_(name1|name2|...)$`, built from the
//! registry's names in registration order. A match binds the value through
//! [`Factory::call1`], which spreads an array for variadic comparators such as
//! `within`; anything else is kept as a literal expectation.
//!
//! When several registered names could end a key, the greedy field group decides:
//! the longest field, and so the shortest matching suffix, wins. Once the field is
//! fixed the remainder is fixed too, so at most one name can match it and the
//! alternation order never changes the outcome. With the built-ins,
//! `count_eq_all` parses as field `count` with `eq_all`, but registering a
//! comparator named `all` turns it into field `count_eq` with `all`.

use crate::comparator::{Expected, Factory, Pair};
use crate::error::Result;
use crate::registry::{with_default_registry, Registry};
use regex::Regex;
use serde_json::Value;
use tracing::trace;

/// Snapshot of a registry's names and factories, compiled into a suffix pattern.
#[derive(Debug, Clone)]
pub struct SuffixParser {
    pattern: Option<Regex>,
    registry: Registry,
}

impl SuffixParser {
    /// Compile the suffix pattern for the registry's current state.
    pub fn new(registry: &Registry) -> Result<Self> {
        Ok(Self {
            pattern: registry.suffix_pattern()?,
            registry: registry.clone(),
        })
    }

    /// Split `key` into `(field, comparator name)`, if it carries a known suffix.
    pub fn split<'k>(&self, key: &'k str) -> Option<(&'k str, &'k str)> {
        let captures = self.pattern.as_ref()?.captures(key)?;
        let field = captures.get(1)?.as_str();
        let name = captures.get(2)?.as_str();
        Some((field, name))
    }

    fn factory_for<'k>(&self, key: &'k str) -> Option<(&'k str, &Factory)> {
        let (field, name) = self.split(key)?;
        Some((field, self.registry.get(name)?))
    }

    /// Turn one `key: value` entry into a field check.
    pub fn parse_entry(&self, key: &str, value: Value) -> Pair {
        match self.factory_for(key) {
            Some((field, factory)) => {
                trace!("'{}' -> {}({})", key, factory.name(), field);
                (field.to_string(), Expected::Comparator(factory.call1(value)))
            }
            None => {
                trace!("'{}' has no comparator suffix, comparing literally", key);
                (key.to_string(), Expected::Literal(value))
            }
        }
    }

    /// Parse all entries, keeping input order.
    pub fn parse<I, K, V>(&self, kwargs: I) -> Vec<Pair>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        kwargs
            .into_iter()
            .map(|(key, value)| self.parse_entry(key.as_ref(), value.into()))
            .collect()
    }
}

/// Parse `kwargs` against `registry` as it is right now.
pub fn parse_with<I, K, V>(registry: &Registry, kwargs: I) -> Result<Vec<Pair>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    Ok(SuffixParser::new(registry)?.parse(kwargs))
}

/// Parse `kwargs` against the process-wide registry.
///
/// The suffix pattern is rebuilt on every call, so comparators registered since the
/// previous call are recognised.
pub fn parse_field_comparators<I, K, V>(kwargs: I) -> Result<Vec<Pair>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    let parser = with_default_registry(SuffixParser::new)?;
    Ok(parser.parse(kwargs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn describe(pairs: &[Pair]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(field, expected)| (field.clone(), expected.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_suffixes_and_literals() {
        let registry = Registry::with_builtins();
        let pairs = parse_with(
            &registry,
            [
                ("status_lt", json!(206)),
                ("body_len_within", json!([300, 400])),
                ("body", json!("asdf")),
            ],
        )
        .unwrap();

        assert_eq!(
            describe(&pairs),
            vec![
                ("status".to_string(), "lt(206)".to_string()),
                ("body_len".to_string(), "within(300, 400)".to_string()),
                ("body".to_string(), r#""asdf""#.to_string()),
            ]
        );
        assert!(pairs[0].1.matches(&json!(200)).unwrap());
        assert!(pairs[1].1.matches(&json!(350)).unwrap());
        assert!(!pairs[1].1.matches(&json!(401)).unwrap());
        assert!(matches!(pairs[2].1, Expected::Literal(_)));
    }

    #[test]
    fn test_parsed_within_behaves_like_direct_within() {
        let registry = Registry::with_builtins();
        let pairs = parse_with(&registry, [("size_within", json!([300, 400]))]).unwrap();
        let direct = registry.bind("within", [300, 400]).unwrap();
        for x in [299, 300, 350, 400, 401] {
            assert_eq!(
                pairs[0].1.matches(&json!(x)).unwrap(),
                direct.equals(&json!(x)).unwrap()
            );
        }
    }

    #[test]
    fn test_parsed_variadic_values() {
        let registry = Registry::with_builtins();
        let pairs = parse_with(
            &registry,
            [
                ("headers_contains_dict", json!([["a", 1], ["b", 2]])),
                ("state_eq_any", json!(["done", "skipped"])),
                ("tags_eq", json!(["x", "y"])),
            ],
        )
        .unwrap();
        assert!(pairs[0].1.matches(&json!({"a": 1, "b": 2, "c": 3})).unwrap());
        assert!(!pairs[0].1.matches(&json!({"a": 1})).unwrap());
        assert!(pairs[1].1.matches(&json!("skipped")).unwrap());
        // `eq` is not variadic, the list is compared as a whole.
        assert!(pairs[2].1.matches(&json!(["x", "y"])).unwrap());
        assert_eq!(pairs[2].1.to_string(), r#"eq(["x","y"])"#);
    }

    #[test]
    fn test_key_must_match_in_full() {
        let registry = Registry::with_builtins();
        let parser = SuffixParser::new(&registry).unwrap();
        assert_eq!(parser.split("status_lt"), Some(("status", "lt")));
        assert_eq!(parser.split("lt"), None);
        assert_eq!(parser.split("_lt"), None);
        assert_eq!(parser.split("status_ltx"), None);
        assert_eq!(parser.split("status-x_lt"), None);
        assert_eq!(parser.split("status_lt "), None);
    }

    #[test]
    fn test_shortest_suffix_wins() {
        let registry = Registry::with_builtins();
        let parser = SuffixParser::new(&registry).unwrap();
        // `eq` and `eq_all` are both registered, only `eq_all` ends the key.
        assert_eq!(parser.split("count_eq_all"), Some(("count", "eq_all")));
        // `dict` is not a comparator, so `contains_dict` is the only candidate.
        assert_eq!(parser.split("headers_contains_dict"), Some(("headers", "contains_dict")));
        assert_eq!(parser.split("body_contains"), Some(("body", "contains")));
    }

    #[test]
    fn test_ambiguous_suffix_prefers_longest_field() {
        let mut registry = Registry::with_builtins();
        registry.register("all", |_, _| Ok(true)).unwrap();
        let parser = SuffixParser::new(&registry).unwrap();
        assert_eq!(parser.split("count_eq_all"), Some(("count_eq", "all")));

        // Registration order does not change the split.
        let names = ["b_c", "a_b_c", "c"];
        let mut forward = Registry::empty();
        let mut backward = Registry::empty();
        for name in names {
            forward.register(name, |_, _| Ok(true)).unwrap();
        }
        for name in names.iter().rev() {
            backward.register(name, |_, _| Ok(true)).unwrap();
        }
        for registry in [&forward, &backward] {
            let parser = SuffixParser::new(registry).unwrap();
            assert_eq!(parser.split("x_a_b_c"), Some(("x_a_b", "c")));
            assert_eq!(parser.split("x_b_c"), Some(("x_b", "c")));
        }
    }

    #[test]
    fn test_empty_registry_keeps_everything_literal() {
        let registry = Registry::empty();
        let pairs = parse_with(&registry, [("status_lt", json!(206))]).unwrap();
        assert_eq!(pairs[0].0, "status_lt");
        assert!(matches!(pairs[0].1, Expected::Literal(_)));
    }

    #[test]
    fn test_parser_sees_registry_state_at_parse_time() {
        let mut registry = Registry::with_builtins();
        let before = parse_with(&registry, [("name_is_upper", json!(true))]).unwrap();
        assert_eq!(before[0].0, "name_is_upper");

        registry
            .register("is_upper", |actual, _| {
                Ok(actual
                    .as_str()
                    .is_some_and(|s| s.chars().all(|c| !c.is_lowercase())))
            })
            .unwrap();
        let after = parse_with(&registry, [("name_is_upper", json!(true))]).unwrap();
        assert_eq!(after[0].0, "name");
        assert!(after[0].1.matches(&json!("ABC")).unwrap());
    }

    #[test]
    fn test_parse_with_default_registry() {
        let pairs = parse_field_comparators([("code_one_of", json!([200, 204]))]).unwrap();
        assert_eq!(pairs[0].0, "code");
        assert!(pairs[0].1.matches(&json!(204)).unwrap());
    }
}
