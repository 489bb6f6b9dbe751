//! Construction options and the missing-key policy.

use crate::error::Error;
use crate::functions::{EqualFn, HashFn, KeyFunctions, NormalizeFn};
use core::fmt;
use core::str::FromStr;
use serde::Serialize;
use std::rc::Rc;

/// What `Map::query` does when the key is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingKeyPolicy {
    /// Fail with [`Error::MissingKey`].
    #[default]
    Throw,
    /// Return the map's default value.
    Default,
}

impl MissingKeyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingKeyPolicy::Throw => "throw",
            MissingKeyPolicy::Default => "default",
        }
    }
}

impl FromStr for MissingKeyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "throw" => Ok(MissingKeyPolicy::Throw),
            "default" => Ok(MissingKeyPolicy::Default),
            other => Err(Error::Validation(format!(
                "missing-key policy must be \"throw\" or \"default\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for MissingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key functions a table is built with.
///
/// Starts from either the defaults ([`TableOptions::new`]) or an explicit
/// hash/equality pair ([`TableOptions::with_functions`]), then individual
/// functions can be swapped out.
///
/// ```
/// use deep_hashtable::{Map, TableOptions};
///
/// let opts = TableOptions::<String>::new().with_normalize_fn(|k: &String| k.to_lowercase());
/// let mut m = Map::with_options(opts);
/// m.insert("Key".to_string(), 1);
/// assert_eq!(m.get(&"KEY".to_string()), Some(&1));
/// ```
pub struct TableOptions<K> {
    hash: HashFn<K>,
    equal: EqualFn<K>,
    normalize: Option<NormalizeFn<K>>,
}

impl<K> TableOptions<K>
where
    K: Serialize + PartialEq + 'static,
{
    /// Default hash (canonical serialization + SHA-256), `PartialEq`
    /// equality, identity normalizer.
    pub fn new() -> Self {
        KeyFunctions::standard().into()
    }
}

impl<K> Default for TableOptions<K>
where
    K: Serialize + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> From<KeyFunctions<K>> for TableOptions<K> {
    fn from(f: KeyFunctions<K>) -> Self {
        Self {
            hash: f.hash_fn().clone(),
            equal: f.equal_fn().clone(),
            normalize: f.normalize_fn().cloned(),
        }
    }
}

impl<K> TableOptions<K> {
    /// Options for key types without `Serialize`/`PartialEq`: both functions
    /// are supplied by the caller.
    pub fn with_functions<H, E>(hash: H, equal: E) -> Self
    where
        H: Fn(&K) -> String + 'static,
        E: Fn(&K, &K) -> bool + 'static,
    {
        Self {
            hash: Rc::new(hash),
            equal: Rc::new(equal),
            normalize: None,
        }
    }

    pub fn with_hash_fn<H>(mut self, hash: H) -> Self
    where
        H: Fn(&K) -> String + 'static,
    {
        self.hash = Rc::new(hash);
        self
    }

    pub fn with_equal_fn<E>(mut self, equal: E) -> Self
    where
        E: Fn(&K, &K) -> bool + 'static,
    {
        self.equal = Rc::new(equal);
        self
    }

    pub fn with_normalize_fn<N>(mut self, normalize: N) -> Self
    where
        N: Fn(&K) -> K + 'static,
    {
        self.normalize = Some(Rc::new(normalize));
        self
    }

    pub(crate) fn into_functions(self) -> KeyFunctions<K> {
        KeyFunctions::new(self.hash, self.equal, self.normalize)
    }
}
