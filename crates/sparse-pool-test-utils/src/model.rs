//! Reference model of a handle registry.
//!
//! Mirrors the observable behaviour of a pool-plus-map registry with plain
//! collections: an `IndexMap` from handle to (slot, record) and an explicit
//! LIFO free stack. Slow and simple on purpose so it can serve as an oracle.

use indexmap::IndexMap;

/// Oracle for handle → slot → record behaviour.
pub struct ModelRegistry {
    record_size: usize,
    entries: IndexMap<u64, (u32, Vec<u8>)>,
    free_stack: Vec<u32>,
    high_water_mark: u32,
}

impl ModelRegistry {
    pub fn new(record_size: usize) -> Self {
        Self {
            record_size,
            entries: IndexMap::new(),
            free_stack: Vec::new(),
            high_water_mark: 0,
        }
    }

    /// Register or overwrite `handle`.
    ///
    /// Returns the slot and whether an existing record was replaced.
    pub fn insert(&mut self, handle: u64, record: &[u8]) -> (u32, bool) {
        assert_eq!(record.len(), self.record_size, "model record size");
        if let Some((slot, bytes)) = self.entries.get_mut(&handle) {
            bytes.copy_from_slice(record);
            return (*slot, true);
        }
        let slot = self.free_stack.pop().unwrap_or_else(|| {
            let slot = self.high_water_mark;
            self.high_water_mark += 1;
            slot
        });
        self.entries.insert(handle, (slot, record.to_vec()));
        (slot, false)
    }

    pub fn get(&self, handle: u64) -> Option<&[u8]> {
        self.entries.get(&handle).map(|(_, bytes)| bytes.as_slice())
    }

    pub fn slot_of(&self, handle: u64) -> Option<u32> {
        self.entries.get(&handle).map(|(slot, _)| *slot)
    }

    /// Unregister `handle`, returning its freed slot.
    pub fn remove(&mut self, handle: u64) -> Option<u32> {
        let (slot, _) = self.entries.shift_remove(&handle)?;
        self.free_stack.push(slot);
        Some(slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn high_water_mark(&self) -> u32 {
        self.high_water_mark
    }

    /// Registered handles in first-insertion order.
    pub fn handles(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    /// Live records sorted by slot, the order a teardown finalizer sees them.
    pub fn records_by_slot(&self) -> Vec<Vec<u8>> {
        let mut live: Vec<_> = self.entries.values().collect();
        live.sort_unstable_by_key(|(slot, _)| *slot);
        live.into_iter().map(|(_, bytes)| bytes.clone()).collect()
    }
}
