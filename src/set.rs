//! Set: key-only table over arbitrary keys.

use crate::config::TableOptions;
use crate::functions::{EqualFn, HashFn, KeyFunctions, NormalizeFn};
use crate::hashtable::Hashtable;
use crate::resolver::Resolution;
use core::fmt;
use serde::Serialize;
use std::rc::Rc;

/// A hash set whose members are identified through pluggable normalize,
/// hash and equality functions. Membership is the key store alone; there is
/// no value storage.
///
/// ```
/// use deep_hashtable::Set;
///
/// let mut s = Set::new();
/// s.insert(("x", 1));
/// assert!(s.query(&("x", 1)));
/// assert!(!s.query(&("x", 2)));
/// ```
pub struct Set<K> {
    table: Hashtable<K>,
}

impl<K> Set<K>
where
    K: Serialize + PartialEq + 'static,
{
    pub fn new() -> Self {
        Self::with_options(TableOptions::new())
    }

    /// Set built from an initial batch of keys; duplicates collapse.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut s = Self::new();
        s.extend(keys);
        s
    }
}

impl<K> Default for Set<K>
where
    K: Serialize + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Set<K> {
    pub fn with_options(options: TableOptions<K>) -> Self {
        Self {
            table: Hashtable::new(options.into_functions()),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Adds `key`; returns `false` if an equal key was already present, in
    /// which case the stored raw key is replaced by `key`.
    pub fn insert(&mut self, key: K) -> bool {
        match self.table.resolve(&key) {
            Resolution::Occupied(id) => {
                self.table.store_key(id, key);
                false
            }
            Resolution::Vacant(id) => {
                self.table.store_key(id, key);
                true
            }
        }
    }

    /// Removes `key`; returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.table.find(key) {
            Some(id) => self.table.remove_key(&id).is_some(),
            None => false,
        }
    }

    /// Membership test; never fails on a missing key.
    pub fn query(&self, key: &K) -> bool {
        self.has_key(key)
    }

    pub fn has_key(&self, key: &K) -> bool {
        self.table.find(key).is_some()
    }

    /// The stored raw key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        let id = self.table.find(key)?;
        self.table.key_at(&id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|(_, k)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.keys()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Element-wise [`Set::query`] in input order.
    pub fn query_many(&self, keys: &[K]) -> Vec<bool> {
        keys.iter().map(|k| self.query(k)).collect()
    }

    /// Element-wise [`Set::insert`]; returns how many keys were new.
    pub fn insert_many<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
    {
        let mut added = 0;
        for k in keys {
            if self.insert(k) {
                added += 1;
            }
        }
        added
    }

    /// Element-wise [`Set::delete`]; returns how many keys were removed.
    pub fn delete_many(&mut self, keys: &[K]) -> usize {
        keys.iter().filter(|k| self.delete(k)).count()
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

    /// Replaces the hash function and re-keys stored members.
    pub fn set_hash_fn<H>(&mut self, hash: H)
    where
        H: Fn(&K) -> String + 'static,
    {
        let mut f = self.table.functions().clone();
        f.set_hash_fn(Rc::new(hash));
        self.reconfigure(f);
    }

    /// Replaces the equality function and re-keys stored members; members
    /// the new function equates collapse into one.
    pub fn set_equal_fn<E>(&mut self, equal: E)
    where
        E: Fn(&K, &K) -> bool + 'static,
    {
        let mut f = self.table.functions().clone();
        f.set_equal_fn(Rc::new(equal));
        self.reconfigure(f);
    }

    pub fn set_normalize_fn(&mut self, normalize: Option<NormalizeFn<K>>) {
        let mut f = self.table.functions().clone();
        f.set_normalize_fn(normalize);
        self.reconfigure(f);
    }

    fn reconfigure(&mut self, functions: KeyFunctions<K>) {
        let plan = self.table.plan_rekey(&functions);
        self.table.apply_rekey(functions, &plan);
    }
}

impl<K: Clone> Clone for Set<K> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Set<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<K> Extend<K> for Set<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K> FromIterator<K> for Set<K>
where
    K: Serialize + PartialEq + 'static,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}
