//! Bound comparators and the factories that produce them.
//!
//! A [`Factory`] wraps a named predicate. Binding expected arguments to it yields a
//! [`Comparator`], which stands in for a literal wherever an equality check is
//! made: `comparator.equals(actual)` runs the predicate with `actual` first and the
//! bound arguments after it.
//!
//! Factories marked [`Factory::variadic`] spread a lone array handed to
//! [`Factory::call1`] into separate arguments, so a parsed `[300, 400]` binds like
//! the direct `within(300, 400)`. [`Factory::bind`] never spreads.

use crate::error::Result;
use crate::value::loose_eq;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate signature: `(actual, expected_args) -> bool`.
///
/// Predicates must be side-effect free. Errors propagate to whoever evaluates the
/// comparator.
pub type PredicateFn = dyn Fn(&Value, &[Value]) -> Result<bool> + Send + Sync;

/// A named predicate, ready to bind expected arguments.
#[derive(Clone)]
pub struct Factory {
    name: Arc<str>,
    predicate: Arc<PredicateFn>,
    variadic: bool,
}

impl Factory {
    /// Wrap a predicate under `name`. Name validation happens at registration.
    pub fn new<F>(name: impl Into<Arc<str>>, predicate: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            variadic: false,
        }
    }

    /// Spread a lone array passed to [`Factory::call1`] into separate arguments.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Same predicate under another name.
    pub(crate) fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::clone(&self.predicate),
            variadic: self.variadic,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind all expected arguments, as in a direct `within(300, 400)` call.
    pub fn bind<I, V>(&self, args: I) -> Comparator
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Comparator {
            name: Arc::clone(&self.name),
            predicate: Arc::clone(&self.predicate),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Bind a single expected value, as the kwargs parser does.
    ///
    /// For a variadic factory an array value is spread into the argument list;
    /// otherwise the value stays one argument, list or not.
    pub fn call1(&self, arg: impl Into<Value>) -> Comparator {
        match arg.into() {
            Value::Array(items) if self.variadic => self.bind(items),
            arg => self.bind([arg]),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("variadic", &self.variadic)
            .finish()
    }
}

/// A predicate bound to its expected arguments. Immutable and cheap to clone.
#[derive(Clone)]
pub struct Comparator {
    name: Arc<str>,
    predicate: Arc<PredicateFn>,
    args: Vec<Value>,
}

impl Comparator {
    /// Evaluate the predicate against `actual`.
    pub fn equals(&self, actual: &Value) -> Result<bool> {
        (self.predicate)(actual, &self.args)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// Renders as `name(arg, ...)` with each argument in JSON notation.
impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparator({self})")
    }
}

/// The expected side of a field check: a comparator or a plain literal.
#[derive(Debug, Clone)]
pub enum Expected {
    Literal(Value),
    Comparator(Comparator),
}

impl Expected {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expected::Literal(value.into())
    }

    /// Compare `actual` against this expectation. Literals use numeric-aware equality.
    pub fn matches(&self, actual: &Value) -> Result<bool> {
        match self {
            Expected::Literal(expected) => Ok(loose_eq(actual, expected)),
            Expected::Comparator(comparator) => comparator.equals(actual),
        }
    }

    pub fn as_comparator(&self) -> Option<&Comparator> {
        match self {
            Expected::Comparator(c) => Some(c),
            Expected::Literal(_) => None,
        }
    }
}

impl From<Comparator> for Expected {
    fn from(comparator: Comparator) -> Self {
        Expected::Comparator(comparator)
    }
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        Expected::Literal(value)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(value) => write!(f, "{value}"),
            Expected::Comparator(comparator) => write!(f, "{comparator}"),
        }
    }
}

/// A `(field, expectation)` pair consumed by the matchers.
pub type Pair = (String, Expected);
