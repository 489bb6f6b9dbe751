//! Key functions: normalizer, hash and equality strategies.
//!
//! Every table owns one [`KeyFunctions`] record, built once at construction.
//! The normalizer runs before both the hash and the equality function, so a
//! caller only has to express a key's canonical form once (for example case
//! folding) instead of keeping two custom functions in sync.
//!
//! Contract the table relies on but cannot check: keys that the equality
//! function considers equal (after normalization) must produce the same
//! digest. When that is violated, lookups of an equal key may miss, but two
//! keys the equality function considers distinct are never merged.

use crate::canonical;
use core::ops::Deref;
use log::debug;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::rc::Rc;

/// Maps a normalized key to its digest.
pub type HashFn<K> = Rc<dyn Fn(&K) -> String>;

/// Decides whether two normalized keys denote the same entry.
pub type EqualFn<K> = Rc<dyn Fn(&K, &K) -> bool>;

/// Maps a raw key to its normalized form.
pub type NormalizeFn<K> = Rc<dyn Fn(&K) -> K>;

/// Default hash: canonical JSON serialization hashed with SHA-256, rendered
/// as lowercase hex.
///
/// Maps are serialized with their entries sorted, so maps with the same
/// contents digest identically regardless of their iteration order. Map keys
/// need not be strings and 128-bit integers keep full precision. Digests are
/// stable across runs.
///
/// A key whose own `Serialize` impl reports an error is digested from that
/// error message; such keys share a bucket and are told apart by equality.
pub fn default_hash<K>(key: &K) -> String
where
    K: Serialize + ?Sized,
{
    let text = match canonical::to_value(key) {
        Ok(value) => value.to_string(),
        Err(e) => {
            debug!("default hash: key failed to serialize: {e}");
            format!("\u{0}{e}")
        }
    };
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Default equality: deep structural equality via `PartialEq`.
pub fn default_equal<K>(a: &K, b: &K) -> bool
where
    K: PartialEq + ?Sized,
{
    a == b
}

/// A key after normalization; borrows the raw key when no normalizer is set.
pub enum Normalized<'a, K> {
    Borrowed(&'a K),
    Owned(K),
}

impl<K> Deref for Normalized<'_, K> {
    type Target = K;

    #[inline]
    fn deref(&self) -> &K {
        match self {
            Normalized::Borrowed(k) => k,
            Normalized::Owned(k) => k,
        }
    }
}

/// The composed normalizer + hash + equality record shared by maps and sets.
pub struct KeyFunctions<K> {
    hash: HashFn<K>,
    equal: EqualFn<K>,
    normalize: Option<NormalizeFn<K>>,
}

impl<K> Clone for KeyFunctions<K> {
    fn clone(&self) -> Self {
        Self {
            hash: self.hash.clone(),
            equal: self.equal.clone(),
            normalize: self.normalize.clone(),
        }
    }
}

impl<K> KeyFunctions<K>
where
    K: Serialize + PartialEq + 'static,
{
    /// Default hash, default equality, identity normalizer.
    pub fn standard() -> Self {
        Self::new(Rc::new(default_hash::<K>), Rc::new(default_equal::<K>), None)
    }
}

impl<K> KeyFunctions<K> {
    pub fn new(hash: HashFn<K>, equal: EqualFn<K>, normalize: Option<NormalizeFn<K>>) -> Self {
        Self {
            hash,
            equal,
            normalize,
        }
    }

    pub fn hash_fn(&self) -> &HashFn<K> {
        &self.hash
    }

    pub fn equal_fn(&self) -> &EqualFn<K> {
        &self.equal
    }

    pub fn normalize_fn(&self) -> Option<&NormalizeFn<K>> {
        self.normalize.as_ref()
    }

    pub(crate) fn set_hash_fn(&mut self, hash: HashFn<K>) {
        self.hash = hash;
    }

    pub(crate) fn set_equal_fn(&mut self, equal: EqualFn<K>) {
        self.equal = equal;
    }

    pub(crate) fn set_normalize_fn(&mut self, normalize: Option<NormalizeFn<K>>) {
        self.normalize = normalize;
    }

    #[inline]
    pub fn normalize<'a>(&self, raw: &'a K) -> Normalized<'a, K> {
        match &self.normalize {
            Some(f) => Normalized::Owned(f(raw)),
            None => Normalized::Borrowed(raw),
        }
    }

    /// Digest of an already normalized key.
    #[inline]
    pub fn digest(&self, normalized: &K) -> String {
        (self.hash)(normalized)
    }

    /// Digest of a raw key.
    #[cfg(test)]
    pub fn digest_raw(&self, raw: &K) -> String {
        self.digest(&self.normalize(raw))
    }

    /// Compares a normalized candidate against a stored raw key.
    #[inline]
    pub fn matches(&self, candidate: &K, stored_raw: &K) -> bool {
        let stored = self.normalize(stored_raw);
        (self.equal)(candidate, &*stored)
    }
}
