//! Comparator registry.
//!
//! The registry maps comparator names to their [`Factory`]. Iteration follows
//! registration order, and re-registering a name replaces the factory in place
//! (last registration wins, the original position is kept). That order is also the
//! alternation order of the suffix pattern the kwargs parser uses.
//!
//! A process-wide default registry holding the built-ins backs the free functions
//! of this crate. Tests and embedders that need isolation build their own with
//! [`Registry::with_builtins`] or [`Registry::empty`].

use crate::builtins;
use crate::comparator::{Comparator, Factory};
use crate::error::{CompareError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(r"^\w+$").expect("static name pattern"))
}

/// Ordered name -> factory mapping.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    factories: Vec<Factory>,
}

impl Registry {
    /// A registry with no comparators. The parser treats every key as a literal.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in predicate set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        builtins::install(&mut registry);
        registry
    }

    /// Register `predicate` under `name` and return its factory.
    ///
    /// `name` must consist of word characters only. An existing entry with the same
    /// name is silently replaced.
    pub fn register<F>(&mut self, name: &str, predicate: F) -> Result<Factory>
    where
        F: Fn(&Value, &[Value]) -> Result<bool> + Send + Sync + 'static,
    {
        self.register_factory(Factory::new(name, predicate))
    }

    /// Register an already built factory, e.g. to alias an existing predicate.
    pub fn register_factory(&mut self, factory: Factory) -> Result<Factory> {
        if !name_regex().is_match(factory.name()) {
            return Err(CompareError::InvalidName(factory.name().to_string()));
        }
        self.insert(factory.clone());
        Ok(factory)
    }

    /// Add or replace without validating the name.
    pub(crate) fn insert(&mut self, factory: Factory) {
        match self.position(factory.name()) {
            Some(index) => {
                debug!("Replacing comparator '{}'", factory.name());
                self.factories[index] = factory;
            }
            None => {
                debug!("Registered comparator '{}'", factory.name());
                self.factories.push(factory);
            }
        }
    }

    /// Register `alias` as another name for the predicate behind `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<Factory> {
        let target = self.factory(target)?;
        self.register_factory(target.renamed(alias))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.factories.iter().position(|f| f.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Factory> {
        self.factories.iter().find(|f| f.name() == name)
    }

    /// Like [`Registry::get`], but unknown names are an error.
    pub fn factory(&self, name: &str) -> Result<Factory> {
        self.get(name)
            .cloned()
            .ok_or_else(|| CompareError::UnknownComparator(name.to_string()))
    }

    /// Look up `name` and bind `args` in one step.
    pub fn bind<I, V>(&self, name: &str, args: I) -> Result<Comparator>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Ok(self.factory(name)?.bind(args))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(Factory::name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Anchored `(field)_(name1|name2|...)` pattern over the current names.
    ///
    /// Returns `None` for an empty registry.
    pub(crate) fn suffix_pattern(&self) -> Result<Option<Regex>> {
        if self.factories.is_empty() {
            return Ok(None);
        }
        let alternation = self
            .names()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"^(\w+)_({alternation})$");
        Ok(Some(Regex::new(&pattern)?))
    }
}

static DEFAULT_REGISTRY: Lazy<RwLock<Registry>> =
    Lazy::new(|| RwLock::new(Registry::with_builtins()));

/// Run `f` against a snapshot of the process-wide registry.
///
/// The lock is released before `f` runs, so `f` may use the free constructors or
/// register comparators itself. Registrations made meanwhile are not visible in
/// the snapshot.
pub fn with_default_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    let snapshot = DEFAULT_REGISTRY.read().clone();
    f(&snapshot)
}

/// Run `f` with exclusive access to the process-wide registry.
///
/// The write lock is held while `f` runs: calling back into the default registry
/// from `f` (including the free constructors such as `eq`) deadlocks.
pub fn with_default_registry_mut<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    f(&mut DEFAULT_REGISTRY.write())
}

/// Register a comparator in the process-wide registry.
pub fn register_comparator<F>(name: &str, predicate: F) -> Result<Factory>
where
    F: Fn(&Value, &[Value]) -> Result<bool> + Send + Sync + 'static,
{
    with_default_registry_mut(|registry| registry.register(name, predicate))
}

/// Fetch a factory from the process-wide registry.
pub fn comparator(name: &str) -> Result<Factory> {
    DEFAULT_REGISTRY.read().factory(name)
}

pub(crate) fn default_factory(name: &str) -> Option<Factory> {
    DEFAULT_REGISTRY.read().get(name).cloned()
}
