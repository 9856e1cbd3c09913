use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Separates positional arguments from keyword arguments inside a cache key.
/// Never collides with an argument value because the key framing keeps
/// positionals inside their own array.
const KWD_MARK: &str = "__kwd_mark__";

/// Arguments for one invocation of a runnable unit.
///
/// Positional arguments keep their order; keyword arguments are held in a
/// map sorted by key, so two calls that pass the same keywords in a
/// different order are the same call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument. A repeated key keeps the last value.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(key.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// Positional argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument named `key`, if present.
    pub fn kw(&self, key: &str) -> Option<&Value> {
        self.keyword.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Deterministic identity of one call, used to memoize results.
///
/// Derived from the defining inputs of the call: the function name, the
/// positional arguments in order, a sentinel marker, and the keyword
/// arguments sorted by key. Rendered as canonical JSON so equal calls
/// compare equal structurally and distinct calls cannot collide through
/// concatenation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_call(name: &str, args: &CallArgs) -> Self {
        let tuple = json!([name, args.positional, KWD_MARK, args.keyword]);
        Self(tuple.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
