//! FxHash-backed maps for the translator tables and per-method local pools.

use std::collections::HashMap;

use rustc_hash::FxBuildHasher;

/// Keys here are small `Copy` codes or register/type pairs.
pub type FastHashMap<K, V> = HashMap<K, V, FxBuildHasher>;

/// Map presized for `capacity` entries, e.g. one per known opcode.
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}
