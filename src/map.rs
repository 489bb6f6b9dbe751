//! Map: key -> value table over arbitrary keys.

use crate::config::{MissingKeyPolicy, TableOptions};
use crate::error::{Error, Result};
use crate::functions::{EqualFn, HashFn, KeyFunctions, NormalizeFn};
use crate::hashtable::Hashtable;
use crate::key_store::{self, SlotId};
use crate::resolver::Resolution;
use core::fmt;
use hashbrown::HashMap;
use serde::Serialize;

/// A hash map whose keys are identified through pluggable normalize, hash
/// and equality functions rather than `Hash + Eq`.
///
/// Values live in a value store keyed by the same slot ids as the key
/// store; both always hold exactly the same set of slot ids.
///
/// ```
/// use deep_hashtable::{Map, MissingKeyPolicy};
///
/// let mut m = Map::new().with_missing_key_policy(MissingKeyPolicy::Default);
/// m.insert(vec![1, 2], "pair");
/// m.insert(vec![3], "single");
/// assert_eq!(m.query(&vec![1, 2]), Ok(Some(&"pair")));
/// assert_eq!(m.query(&vec![9]), Ok(None));
/// ```
pub struct Map<K, V> {
    table: Hashtable<K>,
    values: HashMap<SlotId, V>,
    on_missing_key: MissingKeyPolicy,
    default_value: Option<V>,
}

/// Iterator over `(key, value)` pairs in first-insertion order.
pub struct Iter<'a, K, V> {
    keys: key_store::Iter<'a, K>,
    values: &'a HashMap<SlotId, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for (id, k) in self.keys.by_ref() {
            if let Some(v) = self.values.get(id) {
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K, V> Map<K, V>
where
    K: Serialize + PartialEq + 'static,
{
    /// Empty map with the default key functions and the `throw` policy.
    pub fn new() -> Self {
        Self::with_options(TableOptions::new())
    }

    /// Map built from an initial batch of pairs; later duplicates overwrite.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut m = Self::new();
        m.extend(pairs);
        m
    }

    /// Map built from parallel key and value sequences of equal length.
    pub fn from_parallel(keys: Vec<K>, values: Vec<V>) -> Result<Self> {
        let mut m = Self::new();
        m.insert_many(keys, values)?;
        Ok(m)
    }
}

impl<K, V> Default for Map<K, V>
where
    K: Serialize + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Map<K, V> {
    pub fn with_options(options: TableOptions<K>) -> Self {
        Self {
            table: Hashtable::new(options.into_functions()),
            values: HashMap::new(),
            on_missing_key: MissingKeyPolicy::default(),
            default_value: None,
        }
    }

    pub fn with_missing_key_policy(mut self, policy: MissingKeyPolicy) -> Self {
        self.on_missing_key = policy;
        self
    }

    pub fn with_default_value(mut self, value: V) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Inserts or overwrites. On overwrite the stored raw key is replaced by
    /// `key`, the entry keeps its iteration position, and the previous value
    /// is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        // Resolution runs all user code; the writes below cannot fail.
        match self.table.resolve(&key) {
            Resolution::Occupied(id) => {
                self.table.store_key(id.clone(), key);
                self.values.insert(id, value)
            }
            Resolution::Vacant(id) => {
                self.values.insert(id.clone(), value);
                self.table.store_key(id, key);
                None
            }
        }
    }

    /// Removes the entry for `key`, returning its value. Absent keys are a no-op.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let id = self.table.find(key)?;
        self.table.remove_key(&id);
        self.values.remove(&id)
    }

    /// Looks up `key`, applying the missing-key policy when it is absent:
    /// `throw` yields [`Error::MissingKey`], `default` yields the default
    /// value (`None` when unset).
    pub fn query(&self, key: &K) -> Result<Option<&V>> {
        match self.table.resolve(key) {
            Resolution::Occupied(id) => Ok(self.values.get(&id)),
            Resolution::Vacant(id) => match self.on_missing_key {
                MissingKeyPolicy::Default => Ok(self.default_value.as_ref()),
                MissingKeyPolicy::Throw => Err(Error::MissingKey {
                    digest: id.digest().to_string(),
                }),
            },
        }
    }

    /// Policy-free lookup.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = self.table.find(key)?;
        self.values.get(&id)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.table.find(key)?;
        self.values.get_mut(&id)
    }

    /// The stored raw key equal to `key`, which may differ from `key` when a
    /// normalizer or custom equality is in effect.
    pub fn get_key(&self, key: &K) -> Option<&K> {
        let id = self.table.find(key)?;
        self.table.key_at(&id)
    }

    pub fn has_key(&self, key: &K) -> bool {
        self.table.find(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|(_, k)| k)
    }

    /// Values in the same order as [`Map::keys`].
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.table.iter(),
            values: &self.values,
        }
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.values.clear();
    }

    /// Element-wise [`Map::query`]; fails on the first missing key under the
    /// `throw` policy.
    pub fn query_many(&self, keys: &[K]) -> Result<Vec<Option<&V>>> {
        keys.iter().map(|k| self.query(k)).collect()
    }

    /// Element-wise [`Map::insert`] in order. Sequences of different length
    /// are rejected before anything is written.
    pub fn insert_many(&mut self, keys: Vec<K>, values: Vec<V>) -> Result<()> {
        if keys.len() != values.len() {
            return Err(Error::Validation(format!(
                "{} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        for (k, v) in keys.into_iter().zip(values) {
            self.insert(k, v);
        }
        Ok(())
    }

    /// Element-wise [`Map::delete`]; returns how many entries were removed.
    pub fn delete_many(&mut self, keys: &[K]) -> usize {
        keys.iter().filter(|k| self.delete(k).is_some()).count()
    }

    pub fn has_keys(&self, keys: &[K]) -> Vec<bool> {
        keys.iter().map(|k| self.has_key(k)).collect()
    }

    pub fn missing_key_policy(&self) -> MissingKeyPolicy {
        self.on_missing_key
    }

    pub fn set_missing_key_policy(&mut self, policy: MissingKeyPolicy) {
        self.on_missing_key = policy;
    }

    /// Sets the policy from its `"throw"` / `"default"` token. An invalid
    /// token is rejected and the current policy kept.
    pub fn set_missing_key_policy_str(&mut self, token: &str) -> Result<()> {
        self.on_missing_key = token.parse()?;
        Ok(())
    }

    pub fn default_value(&self) -> Option<&V> {
        self.default_value.as_ref()
    }

    pub fn set_default_value(&mut self, value: Option<V>) {
        self.default_value = value;
    }

    pub fn hash_fn(&self) -> &HashFn<K> {
        self.table.functions().hash_fn()
    }

    pub fn equal_fn(&self) -> &EqualFn<K> {
        self.table.functions().equal_fn()
    }

    pub fn normalize_fn(&self) -> Option<&NormalizeFn<K>> {
        self.table.functions().normalize_fn()
    }

    /// Replaces the hash function and re-keys stored entries.
    pub fn set_hash_fn<H>(&mut self, hash: H)
    where
        H: Fn(&K) -> String + 'static,
    {
        let mut f = self.table.functions().clone();
        f.set_hash_fn(std::rc::Rc::new(hash));
        self.reconfigure(f);
    }

    /// Replaces the equality function and re-keys stored entries. Entries
    /// the new function equates collapse into one, keeping the latest value.
    pub fn set_equal_fn<E>(&mut self, equal: E)
    where
        E: Fn(&K, &K) -> bool + 'static,
    {
        let mut f = self.table.functions().clone();
        f.set_equal_fn(std::rc::Rc::new(equal));
        self.reconfigure(f);
    }

    /// Replaces (or with `None`, removes) the normalizer and re-keys stored
    /// entries.
    pub fn set_normalize_fn(&mut self, normalize: Option<NormalizeFn<K>>) {
        let mut f = self.table.functions().clone();
        f.set_normalize_fn(normalize);
        self.reconfigure(f);
    }

    fn reconfigure(&mut self, functions: KeyFunctions<K>) {
        let plan = self.table.plan_rekey(&functions);
        self.table.apply_rekey(functions, &plan);
        let mut old = core::mem::take(&mut self.values);
        for (from, to) in &plan {
            if let Some(v) = old.remove(from) {
                self.values.insert(to.clone(), v);
            }
        }
        debug_assert_eq!(self.values.len(), self.table.len());
    }
}

impl<K: Clone, V: Clone> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            values: self.values.clone(),
            on_missing_key: self.on_missing_key,
            default_value: self.default_value.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Map<K, V>
where
    K: Serialize + PartialEq + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
