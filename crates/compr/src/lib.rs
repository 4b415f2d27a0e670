//! Deferred, composable equality comparators.
//!
//! A comparator binds a named predicate to expected arguments and can be used in
//! place of a literal wherever a field is checked for equality. Instead of asking
//! whether `status == 200`, a check can ask whether `status` is below 206 or whether
//! `body_len` lies within 300..=400.
//!
//! # Module Structure
//!
//! - `comparator` - `Factory`, `Comparator` and the `Expected` literal-or-comparator type
//! - `registry` - Name to factory registry, plus the process-wide default
//! - `builtins` - Built-in predicates and their constructors (`within`, `lt`, ...)
//! - `parser` - `<field>_<comparator>` key parsing
//! - `matchers` - `all_items` / `all_attrs` and the field access traits
//! - `expectations` - Expectation sets loaded from YAML or JSON
//! - `value` - Equality, ordering, membership and length over JSON values
//!
//! # Example
//!
//! ```
//! use compr::{all_attrs, parse_field_comparators, within, lt, Expected};
//! use serde_json::json;
//!
//! let response = json!({"status": 200, "body_len": 350});
//!
//! let pairs = vec![
//!     ("status".to_string(), Expected::from(lt(206))),
//!     ("body_len".to_string(), Expected::from(within(300, 400))),
//! ];
//! assert!(all_attrs(&response, &pairs).unwrap());
//!
//! // Same checks, spelled as suffixed keys.
//! let pairs = parse_field_comparators([
//!     ("status_lt", json!(206)),
//!     ("body_len_within", json!([300, 400])),
//! ])
//! .unwrap();
//! assert!(all_attrs(&response, &pairs).unwrap());
//! ```
//!
//! # Concurrency
//!
//! Evaluation is synchronous. The default registry sits behind a read-write lock,
//! so registering from several threads is safe, but registration order then decides
//! which predicate a name ends up with.

mod builtins;
mod comparator;
mod error;
mod expectations;
mod matchers;
mod parser;
mod registry;
pub mod value;

pub use builtins::{
    contains, contains_dict, endswith, eq, eq_all, eq_any, ge, gt, le, longer_than, lt,
    match_all, match_any, ne, one_of, re_match, re_search, shorter_than, startswith, within,
};
pub use comparator::{Comparator, Expected, Factory, Pair, PredicateFn};
pub use error::{CompareError, Result};
pub use expectations::ExpectationSet;
pub use matchers::{all_attrs, all_items, Attributes, Items, Reflect};
pub use parser::{parse_field_comparators, parse_with, SuffixParser};
pub use registry::{
    comparator, register_comparator, with_default_registry, with_default_registry_mut, Registry,
};
