//! Proptest strategies over registry operations.

use proptest::prelude::*;

/// One step of a randomized registry workload.
#[derive(Clone, Debug)]
pub enum Op {
    /// Register `handle` with a record filled from `fill`.
    Insert { handle: u64, fill: u8 },
    /// Unregister `handle`.
    Remove { handle: u64 },
    /// Look `handle` up.
    Get { handle: u64 },
}

/// Pointer-like handle from a key space of `key_space` distinct values.
///
/// Handles are multiples of 8 with a fixed high base, like heap addresses.
fn handle(key_space: u64) -> impl Strategy<Value = u64> {
    (0..key_space).prop_map(|k| 0x7F00_0000_0000 + k * 8)
}

/// Sequences of up to `max_len` operations over `key_space` handles.
///
/// A small key space keeps updates, removals of live handles and
/// clustered probe runs frequent.
pub fn ops(key_space: u64, max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => (handle(key_space), any::<u8>())
            .prop_map(|(handle, fill)| Op::Insert { handle, fill }),
        3 => handle(key_space).prop_map(|handle| Op::Remove { handle }),
        1 => handle(key_space).prop_map(|handle| Op::Get { handle }),
    ];
    proptest::collection::vec(op, 1..max_len)
}
