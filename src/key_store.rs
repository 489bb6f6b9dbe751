//! KeyStore: slot-id keyed storage of raw keys.
//!
//! Entries live in a `SlotMap`; a digest index maps each digest to its
//! bucket, a vector indexed by collision ordinal (`None` marks a freed
//! ordinal). A sequence index keeps iteration in first-insertion order.

use core::fmt;
use hashbrown::HashMap;
use slotmap::{DefaultKey, SlotMap};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Identifier of one stored key: its digest plus a collision ordinal.
///
/// Renders as the bare digest for ordinal 0 and as `digest#n` otherwise.
/// A `#` or `\` inside the digest is written with a leading `\`, so the
/// rendering of two different slots never coincides.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    digest: String,
    ordinal: usize,
}

impl SlotId {
    pub(crate) fn new(digest: String, ordinal: usize) -> Self {
        Self { digest, ordinal }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.digest.chars() {
            if c == '#' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        if self.ordinal != 0 {
            write!(f, "#{}", self.ordinal)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Entry<K> {
    id: SlotId,
    key: K,
    seq: u64,
}

#[derive(Clone)]
pub struct KeyStore<K> {
    slots: SlotMap<DefaultKey, Entry<K>>,
    buckets: HashMap<String, Vec<Option<DefaultKey>>>,
    order: BTreeMap<u64, DefaultKey>,
    next_seq: u64,
}

impl<K> Default for KeyStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over stored keys in first-insertion order.
pub struct Iter<'a, K> {
    order: btree_map::Values<'a, u64, DefaultKey>,
    slots: &'a SlotMap<DefaultKey, Entry<K>>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a SlotId, &'a K);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = *self.order.next()?;
        self.slots.get(k).map(|e| (&e.id, &e.key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> KeyStore<K> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            buckets: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn locate(&self, id: &SlotId) -> Option<DefaultKey> {
        self.buckets
            .get(&id.digest)
            .and_then(|b| b.get(id.ordinal).copied().flatten())
    }

    #[cfg(test)]
    pub fn contains(&self, id: &SlotId) -> bool {
        self.locate(id).is_some()
    }

    pub fn get(&self, id: &SlotId) -> Option<&K> {
        let k = self.locate(id)?;
        self.slots.get(k).map(|e| &e.key)
    }

    /// Live slots stored under `digest`, in ordinal order.
    pub fn bucket<'a>(&'a self, digest: &str) -> impl Iterator<Item = (&'a SlotId, &'a K)> + 'a {
        self.buckets
            .get(digest)
            .into_iter()
            .flatten()
            .filter_map(move |slot| slot.and_then(|k| self.slots.get(k)))
            .map(|e| (&e.id, &e.key))
    }

    /// Lowest ordinal not in use under `digest`.
    pub fn free_ordinal(&self, digest: &str) -> usize {
        match self.buckets.get(digest) {
            Some(b) => b.iter().position(Option::is_none).unwrap_or(b.len()),
            None => 0,
        }
    }

    /// Stores `key` under `id`. An occupied slot keeps its position in
    /// iteration order and returns the key it held.
    pub fn insert(&mut self, id: SlotId, key: K) -> Option<K> {
        if let Some(k) = self.locate(&id) {
            if let Some(e) = self.slots.get_mut(k) {
                return Some(core::mem::replace(&mut e.key, key));
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let digest = id.digest.clone();
        let ordinal = id.ordinal;
        let k = self.slots.insert(Entry { id, key, seq });
        self.order.insert(seq, k);

        let bucket = self.buckets.entry(digest).or_default();
        if bucket.len() <= ordinal {
            bucket.resize(ordinal + 1, None);
        }
        bucket[ordinal] = Some(k);
        None
    }

    pub fn remove(&mut self, id: &SlotId) -> Option<K> {
        let k = self.locate(id)?;
        let entry = self.slots.remove(k)?;
        self.order.remove(&entry.seq);

        // Unlink from the digest index; drop trailing free ordinals.
        if let Some(bucket) = self.buckets.get_mut(&id.digest) {
            bucket[id.ordinal] = None;
            while matches!(bucket.last(), Some(None)) {
                bucket.pop();
            }
            if bucket.is_empty() {
                self.buckets.remove(&id.digest);
            }
        }
        Some(entry.key)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.buckets.clear();
        self.order.clear();
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            order: self.order.values(),
            slots: &self.slots,
        }
    }

    /// Empties the store, returning its entries in iteration order.
    pub fn drain_ordered(&mut self) -> Vec<(SlotId, K)> {
        let mut taken = core::mem::take(self);
        let order = core::mem::take(&mut taken.order);
        order
            .into_values()
            .filter_map(|k| taken.slots.remove(k))
            .map(|e| (e.id, e.key))
            .collect()
    }
}
