//! Benchmark profiles for the sparse-pool handle map.
//!
//! Provides pre-built workloads for the criterion benches:
//!
//! - [`handle_keys`]: deterministic pointer-like handles via seed
//! - [`filled_registry`]: a registry pre-loaded with `n` handles
//! - [`filled_map`]: a bare handle map pre-loaded with `n` keys

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sparse_pool::{Handle, HandleRegistry, SparseMap};
use sparse_pool_test_utils::{record_bytes, KeyStream};

/// Record size used by every registry profile, matching a small driver
/// object descriptor.
pub const RECORD_SIZE: u32 = 32;

/// Generate `n` distinct handles from `seed`.
pub fn handle_keys(n: usize, seed: u64) -> Vec<u64> {
    KeyStream::new(seed).distinct(n)
}

/// Build a registry holding one record for each of `keys`.
pub fn filled_registry(keys: &[u64]) -> HandleRegistry {
    let mut reg = HandleRegistry::with_record_size(RECORD_SIZE).unwrap();
    for &key in keys {
        reg.insert(Handle(key), &record_bytes(key, RECORD_SIZE as usize))
            .unwrap();
    }
    reg
}

/// Build a map from each of `keys` to its position.
pub fn filled_map(keys: &[u64]) -> SparseMap {
    let mut map = SparseMap::default();
    for (i, &key) in keys.iter().enumerate() {
        map.insert(key, i as u32).unwrap();
    }
    map
}
