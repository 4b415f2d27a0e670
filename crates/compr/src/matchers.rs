//! Batch matchers over mapping containers and attribute-bearing objects.
//!
//! Field access goes through one of two capability traits: [`Items`] for keyed
//! lookup and [`Attributes`] for named fields. A missing field is an ordinary
//! mismatch, while predicate errors abort the batch and reach the caller.

use crate::comparator::Pair;
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Keyed lookup, like indexing a mapping.
pub trait Items {
    fn item(&self, key: &str) -> Option<Cow<'_, Value>>;
}

/// Named-field lookup, like reading an attribute.
pub trait Attributes {
    fn attr(&self, name: &str) -> Option<Cow<'_, Value>>;
}

impl Items for Map<String, Value> {
    fn item(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

impl<S: std::hash::BuildHasher> Items for HashMap<String, Value, S> {
    fn item(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

impl Items for BTreeMap<String, Value> {
    fn item(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

/// Only objects have items; any other value has none.
impl Items for Value {
    fn item(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.as_object()?.get(key).map(Cow::Borrowed)
    }
}

/// Object members double as attributes.
impl Attributes for Value {
    fn attr(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.item(name)
    }
}

impl<T: Items + ?Sized> Items for &T {
    fn item(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).item(key)
    }
}

impl<T: Attributes + ?Sized> Attributes for &T {
    fn attr(&self, name: &str) -> Option<Cow<'_, Value>> {
        (**self).attr(name)
    }
}

/// Exposes the serialized fields of any `Serialize` type as attributes.
///
/// The value is serialized once, up front. Field names follow the type's serde
/// attributes (`rename`, `skip`, ...).
#[derive(Debug, Clone)]
pub struct Reflect {
    fields: Map<String, Value>,
}

impl Reflect {
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let fields = match serde_json::to_value(value)? {
            Value::Object(fields) => fields,
            // Scalars and sequences have no named fields.
            _ => Map::new(),
        };
        Ok(Self { fields })
    }
}

impl Attributes for Reflect {
    fn attr(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.fields.get(name).map(Cow::Borrowed)
    }
}

fn all_fields<'a, F>(pairs: &[Pair], lookup: F) -> Result<bool>
where
    F: Fn(&str) -> Option<Cow<'a, Value>>,
{
    for (field, expected) in pairs {
        let Some(actual) = lookup(field) else {
            trace!("field '{}' missing", field);
            return Ok(false);
        };
        if !expected.matches(&actual)? {
            trace!("field '{}' = {} does not match {}", field, actual, expected);
            return Ok(false);
        }
    }
    Ok(true)
}

/// True iff every field is a key of `container` and its value matches.
///
/// Pairs are checked in order and evaluation stops at the first mismatch.
pub fn all_items<C: Items + ?Sized>(container: &C, pairs: &[Pair]) -> Result<bool> {
    all_fields(pairs, |key| container.item(key))
}

/// True iff every field is an attribute of `obj` and its value matches.
///
/// Pairs are checked in order and evaluation stops at the first mismatch.
pub fn all_attrs<O: Attributes + ?Sized>(obj: &O, pairs: &[Pair]) -> Result<bool> {
    all_fields(pairs, |name| obj.attr(name))
}
