//! Declarative expectation sets loaded from YAML or JSON.
//!
//! An expectation set is the serialized form of the kwargs the parser consumes:
//!
//! ```yaml
//! status_lt: 206
//! body_len_within: [300, 400]
//! content_type_startswith: application/json
//! ```
//!
//! Key order from the document is preserved, so matchers short-circuit in the
//! order the checks were written.

use crate::comparator::Pair;
use crate::error::Result;
use crate::matchers::{all_attrs, all_items, Attributes, Items};
use crate::parser::SuffixParser;
use crate::registry::{with_default_registry, Registry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExpectationSet {
    entries: Map<String, Value>,
}

impl ExpectationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Add or replace an entry. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse the entries into field checks against `registry`.
    pub fn pairs(&self, registry: &Registry) -> Result<Vec<Pair>> {
        let parser = SuffixParser::new(registry)?;
        Ok(self.parse(&parser))
    }

    /// Parse the entries against the process-wide registry.
    pub fn default_pairs(&self) -> Result<Vec<Pair>> {
        let parser = with_default_registry(SuffixParser::new)?;
        Ok(self.parse(&parser))
    }

    fn parse(&self, parser: &SuffixParser) -> Vec<Pair> {
        parser.parse(self.entries.iter().map(|(k, v)| (k, v.clone())))
    }

    /// Keys that look like `<field>_<suffix>` but whose suffix is no registered
    /// comparator. They are still valid literal checks; this only flags likely typos.
    pub fn unknown_suffixes(&self, registry: &Registry) -> Result<Vec<String>> {
        let parser = SuffixParser::new(registry)?;
        Ok(self
            .entries
            .keys()
            .filter(|key| parser.split(key).is_none())
            .filter(|key| {
                key.rsplit_once('_')
                    .is_some_and(|(field, suffix)| !field.is_empty() && !suffix.is_empty())
            })
            .cloned()
            .collect())
    }

    /// Check a mapping container against the set using the process-wide registry.
    pub fn matches_items<C: Items + ?Sized>(&self, container: &C) -> Result<bool> {
        all_items(container, &self.default_pairs()?)
    }

    /// Check an attribute-bearing object against the set using the process-wide registry.
    pub fn matches_attrs<O: Attributes + ?Sized>(&self, obj: &O) -> Result<bool> {
        all_attrs(obj, &self.default_pairs()?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ExpectationSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompareError;
    use serde_json::json;

    const RESPONSE_YAML: &str = r#"
status_lt: 206
body_len_within: [300, 400]
content_type_startswith: application/json
method: GET
"#;

    #[test]
    fn test_from_yaml_preserves_order() {
        let set = ExpectationSet::from_yaml_str(RESPONSE_YAML).unwrap();
        let keys: Vec<_> = set.entries().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["status_lt", "body_len_within", "content_type_startswith", "method"]
        );

        let pairs = set.pairs(&Registry::with_builtins()).unwrap();
        let fields: Vec<_> = pairs.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["status", "body_len", "content_type", "method"]);
    }

    #[test]
    fn test_from_json() {
        let set =
            ExpectationSet::from_json_str(r#"{"code_one_of": [200, 204], "ok": true}"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.matches_items(&json!({"code": 204, "ok": true})).unwrap());
        assert!(!set.matches_items(&json!({"code": 500, "ok": true})).unwrap());
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            ExpectationSet::from_yaml_str("- just\n- a list\n"),
            Err(CompareError::Yaml(_))
        ));
        assert!(matches!(
            ExpectationSet::from_json_str("[1, 2]"),
            Err(CompareError::Json(_))
        ));
    }

    #[test]
    fn test_matches_attrs() {
        let set = ExpectationSet::from_yaml_str(RESPONSE_YAML).unwrap();
        let response = json!({
            "status": 200,
            "body_len": 350,
            "content_type": "application/json; charset=utf-8",
            "method": "GET",
        });
        assert!(set.matches_attrs(&response).unwrap());

        let mut stricter = set.clone();
        stricter.insert("status_lt", 200);
        assert!(!stricter.matches_attrs(&response).unwrap());
        assert_eq!(stricter.entries().next(), Some(("status_lt", &json!(200))));
    }

    #[test]
    fn test_unknown_suffixes() {
        let set: ExpectationSet = [
            ("status_lt", json!(206)),
            ("status_less_than", json!(206)),
            ("body", json!("x")),
            ("_private", json!(1)),
        ]
        .into_iter()
        .collect();
        let unknown = set.unknown_suffixes(&Registry::with_builtins()).unwrap();
        assert_eq!(unknown, vec!["status_less_than".to_string()]);
    }

    #[test]
    fn test_roundtrip_serialization_shape() {
        let mut set = ExpectationSet::new();
        set.insert("a_eq", 1).insert("b", "x");
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({"a_eq": 1, "b": "x"}));
        assert!(!set.is_empty());
    }
}
