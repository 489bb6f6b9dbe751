//! deep-hashtable: single-threaded hash maps and sets over structurally
//! complex keys, with pluggable hash, equality and key normalization.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let callers key tables by arbitrary values (vectors, structs,
//!   JSON documents) and decide themselves what "same key" means, without
//!   requiring `Hash + Eq` on the key type.
//! - Layers:
//!   - KeyFunctions<K>: normalizer, hash function (key -> string digest)
//!     and equality function, composed once per table.
//!   - KeyStore<K>: slot-id keyed storage of raw keys with a digest index
//!     and first-insertion iteration order.
//!   - resolver: maps a key to the slot it occupies or would occupy by
//!     scanning the digest's bucket with the equality function.
//!   - Hashtable<K>: the record shared by both facades (functions + key
//!     store), including re-keying when functions change.
//!   - Map<K, V> / Set<K>: public facades. The map adds a value store keyed
//!     by the same slot ids plus a missing-key policy; the set is the key
//!     store alone.
//!
//! Slot ids
//! - A key's slot id is its digest when no other live key shares that
//!   digest, and `digest#n` for the n-th colliding key. Freed ordinals are
//!   reused lowest-first.
//! - The digest never decides identity on its own: distinct keys (per the
//!   equality function) sharing a digest always get distinct slots. A poor
//!   hash degrades access to a linear scan of its bucket.
//!
//! Hash/equality contract
//! - Keys the equality function considers equal (after normalization) must
//!   produce equal digests. The table cannot check this; when it is
//!   violated, lookups of equal keys may miss.
//!
//! Failure model
//! - User functions are infallible closures; a panic inside one unwinds out
//!   of the triggering call. All user code for an operation runs during
//!   resolution, before any store is written, so a panicking function
//!   leaves the table exactly as it was, map inserts included. Function
//!   setters plan the full re-keying before touching storage for the same
//!   reason.
//!
//! Constraints and non-goals
//! - Single-threaded: functions are held in `Rc`, so tables are
//!   `!Send`/`!Sync`. Wrap in a lock for shared use.
//! - No persistence, no load-factor tuning (growth is delegated to the
//!   underlying `hashbrown`/`slotmap` storage).

mod canonical;
pub mod config;
pub mod error;
pub mod functions;
mod hashtable;
pub mod key_store;
pub mod map;
#[cfg(test)]
mod map_proptest;
pub mod resolver;
pub mod set;

// Public surface
pub use config::{MissingKeyPolicy, TableOptions};
pub use error::{Error, Result};
pub use functions::{default_equal, default_hash, EqualFn, HashFn, NormalizeFn};
pub use key_store::SlotId;
pub use map::Map;
pub use set::Set;
