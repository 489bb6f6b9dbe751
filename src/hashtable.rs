//! Hashtable: the configuration and key storage shared by maps and sets.

use crate::functions::KeyFunctions;
use crate::key_store::{self, KeyStore, SlotId};
use crate::resolver::{self, Resolution};
use hashbrown::HashMap;
use log::debug;

pub(crate) struct Hashtable<K> {
    functions: KeyFunctions<K>,
    keys: KeyStore<K>,
}

impl<K: Clone> Clone for Hashtable<K> {
    fn clone(&self) -> Self {
        Self {
            functions: self.functions.clone(),
            keys: self.keys.clone(),
        }
    }
}

/// Where each stored slot moves when the key functions change. Entries
/// are in iteration order; several old slots may map to one new slot when
/// the new functions merge keys, in which case the later one wins.
pub(crate) type RekeyPlan = Vec<(SlotId, SlotId)>;

impl<K> Hashtable<K> {
    pub fn new(functions: KeyFunctions<K>) -> Self {
        Self {
            functions,
            keys: KeyStore::new(),
        }
    }

    pub fn functions(&self) -> &KeyFunctions<K> {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn resolve(&self, key: &K) -> Resolution {
        resolver::resolve(&self.functions, &self.keys, key)
    }

    /// Slot holding a key equal to `key`, if any.
    pub fn find(&self, key: &K) -> Option<SlotId> {
        self.resolve(key).occupied()
    }

    pub fn key_at(&self, id: &SlotId) -> Option<&K> {
        self.keys.get(id)
    }

    pub fn iter(&self) -> key_store::Iter<'_, K> {
        self.keys.iter()
    }

    /// Stores the raw key at `id`, returning the raw key it replaced.
    pub fn store_key(&mut self, id: SlotId, key: K) -> Option<K> {
        self.keys.insert(id, key)
    }

    pub fn remove_key(&mut self, id: &SlotId) -> Option<K> {
        self.keys.remove(id)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Computes where every stored key lands under `functions`.
    ///
    /// Runs every user function the re-keying needs and nothing else; the
    /// store is only read, so a panic here leaves the table as it was.
    pub fn plan_rekey(&self, functions: &KeyFunctions<K>) -> RekeyPlan {
        // digest -> (new slot, latest raw key written to it)
        let mut buckets: HashMap<String, Vec<(SlotId, &K)>> = HashMap::new();
        let mut plan = Vec::with_capacity(self.keys.len());

        for (old, raw) in self.keys.iter() {
            let candidate = functions.normalize(raw);
            let digest = functions.digest(&candidate);
            let bucket = buckets.entry(digest.clone()).or_default();

            let hit = bucket
                .iter_mut()
                .find(|(_, stored)| functions.matches(&candidate, stored));
            let new_id = match hit {
                Some((id, stored)) => {
                    *stored = raw;
                    id.clone()
                }
                None => {
                    let id = SlotId::new(digest, bucket.len());
                    bucket.push((id.clone(), raw));
                    id
                }
            };
            plan.push((old.clone(), new_id));
        }
        plan
    }

    /// Swaps in `functions` and moves keys according to `plan`, which must
    /// have been computed by [`Hashtable::plan_rekey`] for the same
    /// functions. Runs no user code.
    pub fn apply_rekey(&mut self, functions: KeyFunctions<K>, plan: &RekeyPlan) {
        let mut old: HashMap<SlotId, K> = self.keys.drain_ordered().into_iter().collect();
        for (from, to) in plan {
            if let Some(key) = old.remove(from) {
                self.keys.insert(to.clone(), key);
            }
        }
        debug!(
            "re-keyed {} entries into {} slots",
            plan.len(),
            self.keys.len()
        );
        self.functions = functions;
    }
}
