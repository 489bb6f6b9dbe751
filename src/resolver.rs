//! Bucket resolver: maps a key to the slot it occupies or would occupy.
//!
//! The digest alone never decides identity. Every stored key in the digest's
//! bucket is compared against the candidate with the equality function, so a
//! degenerate hash degrades lookups to a linear scan of the bucket but never
//! merges keys the equality function considers distinct.

use crate::functions::KeyFunctions;
use crate::key_store::{KeyStore, SlotId};
use log::trace;

/// Outcome of resolving a key against a [`KeyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An equal key is stored at this slot.
    Occupied(SlotId),
    /// No equal key is stored; this is the slot a write would allocate.
    Vacant(SlotId),
}

impl Resolution {
    #[cfg(test)]
    pub fn slot(&self) -> &SlotId {
        match self {
            Resolution::Occupied(id) | Resolution::Vacant(id) => id,
        }
    }

    pub fn into_slot(self) -> SlotId {
        match self {
            Resolution::Occupied(id) | Resolution::Vacant(id) => id,
        }
    }

    #[cfg(test)]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Resolution::Occupied(_))
    }

    /// The occupied slot, if any.
    pub fn occupied(self) -> Option<SlotId> {
        match self {
            Resolution::Occupied(id) => Some(id),
            Resolution::Vacant(_) => None,
        }
    }
}

/// Resolves a raw key: normalize, hash, then scan the digest's bucket.
///
/// Only user functions run here; the store is not touched, so a panicking
/// function leaves it unchanged.
pub fn resolve<K>(functions: &KeyFunctions<K>, store: &KeyStore<K>, raw: &K) -> Resolution {
    let candidate = functions.normalize(raw);
    let digest = functions.digest(&candidate);
    resolve_normalized(functions, store, &candidate, digest)
}

/// Resolves an already normalized key with a precomputed digest.
pub fn resolve_normalized<K>(
    functions: &KeyFunctions<K>,
    store: &KeyStore<K>,
    candidate: &K,
    digest: String,
) -> Resolution {
    let mut scanned = 0usize;
    for (id, stored) in store.bucket(&digest) {
        scanned += 1;
        if functions.matches(candidate, stored) {
            if scanned > 1 {
                trace!("digest {digest}: matched slot {id} after scanning {scanned} keys");
            }
            return Resolution::Occupied(id.clone());
        }
    }

    if scanned == 0 {
        return Resolution::Vacant(SlotId::new(digest, 0));
    }
    let ordinal = store.free_ordinal(&digest);
    trace!("digest {digest}: {scanned} colliding keys, allocating ordinal {ordinal}");
    Resolution::Vacant(SlotId::new(digest, ordinal))
}
